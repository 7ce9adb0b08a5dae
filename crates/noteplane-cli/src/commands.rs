//! Subcommand handlers. Each invocation signs in, runs one command
//! through the workspace, and prints the result.

use noteplane_auth::AuthConfig;
use noteplane_core::error::{AuthError, NoteplaneError, NoteplaneResult};
use noteplane_core::models::note::{DeleteOutcome, NoteId};
use noteplane_core::models::user::{Credential, UserId};
use noteplane_core::transport::Backend;
use noteplane_workspace::Workspace;

use crate::Command;
use crate::output::OutputFormat;

pub(crate) async fn execute<B: Backend + Clone>(
    backend: B,
    credential: Credential,
    command: Command,
    format: OutputFormat,
) -> NoteplaneResult<()> {
    let mut ws = Workspace::new(backend, AuthConfig::default());
    ws.login(credential).await?;

    match command {
        Command::Whoami => {
            let actor = ws.current_actor().ok_or_else(signed_out)?;
            let tenant = ws.tenant().ok_or_else(signed_out)?;
            format.print_overview(actor, tenant, &ws.view_state()?);
        }
        Command::Notes => format.print_notes(ws.notes()),
        Command::Add { title, content } => {
            let ack = ws.create_note(&title, &content).await?;
            println!("Created note {}", ack.id);
        }
        Command::Edit { id, title, content } => {
            let ack = ws.update_note(NoteId(id), &title, &content).await?;
            println!("Updated note {}", ack.id);
        }
        Command::Delete { id } => match ws.delete_note(NoteId(id)).await? {
            DeleteOutcome::Deleted => println!("Deleted note {id}"),
            DeleteOutcome::AlreadyAbsent => println!("Note {id} was already gone"),
        },
        Command::Upgrade => {
            let tenant = ws.upgrade_plan().await?;
            println!("Tenant {} is now on the {} plan", tenant.id, tenant.plan);
        }
        Command::Members => format.print_members(ws.members()?, ws.member_count()),
        Command::Invite { email, role } => match ws.invite_member(&email, role).await? {
            Some(member) => format.print_members(std::slice::from_ref(&member), None),
            None => println!("Invited {}", email.trim()),
        },
        Command::ChangePlan { user_id, plan } => {
            let member = ws.change_member_plan_by_id(UserId(user_id), plan).await?;
            format.print_members(std::slice::from_ref(&member), None);
        }
    }
    Ok(())
}

fn signed_out() -> NoteplaneError {
    AuthError::Unauthenticated.into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use noteplane_client::{DEMO_PASSWORD, MemoryBackend};
    use noteplane_core::error::ForbiddenReason;

    #[tokio::test]
    async fn members_command_is_refused_for_members() {
        let backend = MemoryBackend::seeded();
        let err = execute(
            backend.clone(),
            Credential::new("acmeMember", DEMO_PASSWORD),
            Command::Members,
            OutputFormat::Text,
        )
        .await
        .unwrap_err();

        assert!(matches!(
            err,
            NoteplaneError::Auth(AuthError::Forbidden {
                reason: ForbiddenReason::NotAdmin
            })
        ));
        assert_eq!(backend.call_count("list members"), 0);
    }

    #[tokio::test]
    async fn members_command_lists_roster_for_admins() {
        let backend = MemoryBackend::seeded();
        execute(
            backend.clone(),
            Credential::new("acmeAdmin", DEMO_PASSWORD),
            Command::Members,
            OutputFormat::Json,
        )
        .await
        .unwrap();

        assert_eq!(backend.call_count("list members"), 1);
    }
}
