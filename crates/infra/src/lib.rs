//! Infrastructure layer: store adapters, authentication, change feeds,
//! configuration and the guarded operations built on top of them.

pub mod auth_client;
pub mod changes;
pub mod config;
pub mod services;
pub mod store;


pub use auth_client::{AuthClient, AuthError, AuthSession, SessionHandle, SignUpOutcome};
pub use changes::{channel, ChangeFeed, ChangeNotice, ChangeSender, ChannelFeed, PgListenFeed};
pub use config::{ConfigError, MaterialsConfig};
pub use services::{
    delete_or_deactivate, insert_with_candidates, Catalog, DeleteOutcome, Directory, Ledger,
    Recorded, ServiceError,
};
pub use store::{
    CatalogRef, CatalogStore, DirectoryStore, InMemoryStore, LedgerStore, PostgrestStore,
    StoreError, StoreErrorKind, StoreOp, StoreProfiles, StoreResult,
};
