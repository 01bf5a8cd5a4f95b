use materials_auth::Page;

use crate::app::App;
use crate::render;
use crate::UserCommand;

pub async fn run(app: &App, cmd: UserCommand) -> anyhow::Result<()> {
    let session = app.enter(Page::Users).await?;
    match cmd {
        UserCommand::List => {
            let (profiles, invites) = tokio::try_join!(
                app.directory.profiles(&session),
                app.directory.invites(&session),
            )?;
            print!("{}", render::users(&profiles, &invites));
        }
        UserCommand::Invite { email, role } => {
            let invite = app.directory.invite(&session, &email, role).await?;
            println!("invited {} as {} ({})", invite.email, invite.role, invite.id);
        }
        UserCommand::Uninvite { id } => {
            app.directory.uninvite(&session, id).await?;
            println!("invite {id} removed");
        }
        UserCommand::SetRole { user_id, role } => {
            app.directory.set_role(&session, user_id, role).await?;
            println!("{user_id} is now {role}");
        }
    }
    Ok(())
}
