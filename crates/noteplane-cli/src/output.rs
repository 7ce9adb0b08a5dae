//! Output formatting

use clap::ValueEnum;
use noteplane_core::models::membership::Membership;
use noteplane_core::models::note::Note;
use noteplane_core::models::tenant::Tenant;
use noteplane_core::models::user::User;
use noteplane_core::policy::ViewState;
use serde::Serialize;
use serde_json::json;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn print_overview(self, actor: &User, tenant: &Tenant, view: &ViewState) {
        match self {
            Self::Json => print_json(&json!({
                "user": actor,
                "tenant": tenant,
                "can_add_note": view.can_add_note,
                "note_count": view.note_count,
                "quota_remaining": view.quota_remaining,
                "member_count": view.member_count,
            })),
            Self::Text => {
                println!(
                    "{} ({}) in {} [{} plan]",
                    actor.display_name(),
                    actor.role,
                    tenant.id,
                    tenant.plan
                );
                match view.quota_remaining {
                    Some(left) => println!(
                        "Notes: {} owned, {left} left on the free plan",
                        view.note_count
                    ),
                    None => println!("Notes: {} owned, unlimited", view.note_count),
                }
                if let Some(count) = view.member_count {
                    println!("Members: {count}");
                }
            }
        }
    }

    pub fn print_notes(self, notes: &[Note]) {
        match self {
            Self::Json => print_json(&notes),
            Self::Text => {
                if notes.is_empty() {
                    println!("No notes yet.");
                }
                for note in notes {
                    let author = note.created_by.as_deref().unwrap_or("-");
                    println!("#{:<5} {:<40} {author}", note.id.0, note.title);
                }
            }
        }
    }

    pub fn print_members(self, members: &[Membership], total: Option<u64>) {
        match self {
            Self::Json => print_json(&members),
            Self::Text => {
                for m in members {
                    println!(
                        "{:<6} {:<30} {:<7} {}",
                        m.user_id.0,
                        m.username,
                        m.role.as_str(),
                        m.plan.as_str()
                    );
                }
                if let Some(total) = total {
                    println!("{total} member(s)");
                }
            }
        }
    }
}

fn print_json<T: Serialize>(data: &T) {
    println!("{}", serde_json::to_string_pretty(data).unwrap_or_default());
}
