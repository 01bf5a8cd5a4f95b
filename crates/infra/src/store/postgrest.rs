//! REST adapter for the hosted backend (PostgREST dialect).

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;

use materials_auth::{Invite, InviteDraft, Profile, Role};
use materials_core::{InviteId, ItemId, UserId};
use materials_inventory::{
    Collaborator, CollaboratorDraft, HistoryEntry, Item, ItemDraft, Movement, MovementRow,
    ReceiverTotal, StockLevel,
};

use super::{CatalogRef, CatalogStore, DirectoryStore, LedgerStore, StoreError, StoreResult};
use crate::auth_client::SessionHandle;
use crate::config::MaterialsConfig;

const ITEM_COLUMNS: &str = "id,category,name,sku,unit,min_stock,active";
const COLLABORATOR_COLUMNS: &str = "id,name,sector,active";
const STOCK_COLUMNS: &str = "item_id,category,name,sku,unit,min_stock,active,balance";
const MOVEMENT_COLUMNS: &str = "id,created_at,item_id,qty,move_type,receiver_id,created_by,note";
const PROFILE_COLUMNS: &str = "user_id,full_name,role,created_at";
const INVITE_COLUMNS: &str = "id,email,role,created_at,used_at,created_by";

/// Store backed by the REST surface. Requests carry the API key and, when
/// signed in, the session's bearer token.
#[derive(Debug, Clone)]
pub struct PostgrestStore {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    session: SessionHandle,
}

impl PostgrestStore {
    pub fn new(config: &MaterialsConfig, http: reqwest::Client, session: SessionHandle) -> Self {
        Self {
            http,
            base_url: config.rest_url(),
            api_key: config.api_key.clone(),
            session,
        }
    }

    async fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let token = self
            .session
            .access_token()
            .await
            .unwrap_or_else(|| self.api_key.clone());
        self.http
            .request(method, format!("{}/{}", self.base_url, path))
            .header("apikey", &self.api_key)
            .bearer_auth(token)
    }

    async fn send(builder: RequestBuilder) -> StoreResult<reqwest::Response> {
        let resp = builder.send().await?;
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let body = resp.text().await.unwrap_or_default();
        let err = StoreError::from_response(status.as_u16(), &body);
        tracing::debug!(status = status.as_u16(), code = ?err.code, message = %err.message, "store request rejected");
        Err(err)
    }

    async fn fetch<T: DeserializeOwned>(builder: RequestBuilder) -> StoreResult<T> {
        let resp = Self::send(builder).await?;
        resp.json::<T>()
            .await
            .map_err(|e| StoreError::decode(e.to_string()))
    }

    async fn select<T: DeserializeOwned>(
        &self,
        table: &str,
        columns: &str,
        filters: &[(&str, String)],
    ) -> StoreResult<Vec<T>> {
        let mut query: Vec<(&str, String)> = vec![("select", columns.to_string())];
        query.extend(filters.iter().cloned());
        Self::fetch(self.request(Method::GET, table).await.query(&query)).await
    }

    /// Insert or patch returning the single written row.
    async fn write_one<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        method: Method,
        table: &str,
        filters: &[(&str, String)],
        body: &B,
    ) -> StoreResult<T> {
        let builder = self
            .request(method, table)
            .await
            .query(filters)
            .header("Prefer", "return=representation")
            .json(body);
        let mut rows: Vec<T> = Self::fetch(builder).await?;
        if rows.is_empty() {
            return Err(StoreError::not_found(format!("no {table} row matched")));
        }
        Ok(rows.swap_remove(0))
    }

    async fn rpc<T: DeserializeOwned>(&self, function: &str) -> StoreResult<T> {
        let builder = self
            .request(Method::POST, &format!("rpc/{function}"))
            .await
            .json(&json!({}));
        Self::fetch(builder).await
    }
}

fn eq(value: impl core::fmt::Display) -> String {
    format!("eq.{value}")
}

#[async_trait]
impl CatalogStore for PostgrestStore {
    async fn items(&self) -> StoreResult<Vec<Item>> {
        self.select(
            "items",
            ITEM_COLUMNS,
            &[("order", "category.asc,name.asc".to_string())],
        )
        .await
    }

    async fn collaborators(&self) -> StoreResult<Vec<Collaborator>> {
        self.select(
            "collaborators",
            COLLABORATOR_COLUMNS,
            &[("order", "name.asc".to_string())],
        )
        .await
    }

    async fn save_item(&self, draft: &ItemDraft) -> StoreResult<Item> {
        let columns = [("select", ITEM_COLUMNS.to_string())];
        match draft.id {
            None => self.write_one(Method::POST, "items", &columns, draft).await,
            Some(id) => {
                let filters = [columns[0].clone(), ("id", eq(id))];
                self.write_one(Method::PATCH, "items", &filters, draft).await
            }
        }
    }

    async fn save_collaborator(&self, draft: &CollaboratorDraft) -> StoreResult<Collaborator> {
        let columns = [("select", COLLABORATOR_COLUMNS.to_string())];
        match draft.id {
            None => self.write_one(Method::POST, "collaborators", &columns, draft).await,
            Some(id) => {
                let filters = [columns[0].clone(), ("id", eq(id))];
                self.write_one(Method::PATCH, "collaborators", &filters, draft).await
            }
        }
    }

    async fn delete(&self, target: CatalogRef) -> StoreResult<()> {
        let builder = self
            .request(Method::DELETE, target.table())
            .await
            .query(&[("id", eq(target.uuid()))]);
        Self::send(builder).await.map(|_| ())
    }

    async fn set_active(&self, target: CatalogRef, active: bool) -> StoreResult<()> {
        let builder = self
            .request(Method::PATCH, target.table())
            .await
            .query(&[("id", eq(target.uuid()))])
            .json(&json!({ "active": active }));
        Self::send(builder).await.map(|_| ())
    }
}

#[derive(Debug, Deserialize)]
struct BalanceRow {
    balance: Option<i64>,
}

#[async_trait]
impl LedgerStore for PostgrestStore {
    async fn insert_movement(&self, row: &MovementRow) -> StoreResult<()> {
        let builder = self
            .request(Method::POST, "stock_moves")
            .await
            .header("Prefer", "return=minimal")
            .json(row);
        Self::send(builder).await.map(|_| ())
    }

    async fn item_balance(&self, item_id: ItemId) -> StoreResult<Option<i64>> {
        let rows: Vec<BalanceRow> = self
            .select("v_stock", "item_id,balance", &[("item_id", eq(item_id))])
            .await?;
        Ok(rows.into_iter().next().map(|r| r.balance.unwrap_or(0)))
    }

    async fn stock_levels(&self) -> StoreResult<Vec<StockLevel>> {
        self.select(
            "v_stock",
            STOCK_COLUMNS,
            &[("order", "category.asc,name.asc".to_string())],
        )
        .await
    }

    async fn movements_since(&self, since: DateTime<Utc>) -> StoreResult<Vec<Movement>> {
        self.select(
            "stock_moves",
            MOVEMENT_COLUMNS,
            &[
                (
                    "created_at",
                    format!("gte.{}", since.to_rfc3339_opts(SecondsFormat::Millis, true)),
                ),
                ("order", "created_at.asc".to_string()),
            ],
        )
        .await
    }

    async fn history(&self) -> StoreResult<Vec<HistoryEntry>> {
        self.rpc("v_historico_completo").await
    }

    async fn receiver_ranking(&self) -> StoreResult<Vec<ReceiverTotal>> {
        self.rpc("ranking_colaboradores").await
    }
}

#[derive(Debug, Deserialize)]
struct RoleRow {
    role: Option<String>,
}

#[async_trait]
impl DirectoryStore for PostgrestStore {
    async fn profile_role(&self, user_id: UserId) -> StoreResult<Option<String>> {
        let rows: Vec<RoleRow> = self
            .select("profiles", "role", &[("user_id", eq(user_id))])
            .await?;
        Ok(rows.into_iter().next().and_then(|r| r.role))
    }

    async fn profiles(&self) -> StoreResult<Vec<Profile>> {
        self.select(
            "profiles",
            PROFILE_COLUMNS,
            &[("order", "created_at.asc".to_string())],
        )
        .await
    }

    async fn update_role(&self, user_id: UserId, role: Role) -> StoreResult<()> {
        let _: Profile = self
            .write_one(
                Method::PATCH,
                "profiles",
                &[
                    ("select", PROFILE_COLUMNS.to_string()),
                    ("user_id", eq(user_id)),
                ],
                &json!({ "role": role.storage_label() }),
            )
            .await?;
        Ok(())
    }

    async fn invites(&self) -> StoreResult<Vec<Invite>> {
        self.select(
            "user_invites",
            INVITE_COLUMNS,
            &[("order", "created_at.desc".to_string())],
        )
        .await
    }

    async fn create_invite(&self, draft: &InviteDraft) -> StoreResult<Invite> {
        self.write_one(
            Method::POST,
            "user_invites",
            &[("select", INVITE_COLUMNS.to_string())],
            draft,
        )
        .await
    }

    async fn delete_invite(&self, id: InviteId) -> StoreResult<()> {
        let builder = self
            .request(Method::DELETE, "user_invites")
            .await
            .query(&[("id", eq(id))]);
        Self::send(builder).await.map(|_| ())
    }
}
