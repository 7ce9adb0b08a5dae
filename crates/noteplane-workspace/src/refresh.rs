//! Mutate → invalidate → refetch bookkeeping.
//!
//! Every successful mutation names the aggregates it made stale; the
//! workspace refetches exactly those and clears a flag only once its
//! refetch succeeded.

/// A state-changing operation against the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutation {
    SignIn,
    CreateNote,
    UpdateNote,
    DeleteNote,
    UpgradePlan,
    ChangeMemberPlan,
    InviteMember,
}

impl Mutation {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::SignIn => "sign in",
            Self::CreateNote => "create note",
            Self::UpdateNote => "update note",
            Self::DeleteNote => "delete note",
            Self::UpgradePlan => "upgrade plan",
            Self::ChangeMemberPlan => "change member plan",
            Self::InviteMember => "invite member",
        }
    }

    /// Aggregates whose cached copy no longer matches the server.
    pub fn invalidates(self) -> Stale {
        match self {
            Self::SignIn => Stale::all(),
            Self::CreateNote | Self::UpdateNote | Self::DeleteNote => Stale {
                notes: true,
                ..Stale::default()
            },
            Self::UpgradePlan => Stale {
                tenant: true,
                ..Stale::default()
            },
            Self::ChangeMemberPlan => Stale {
                roster: true,
                ..Stale::default()
            },
            Self::InviteMember => Stale {
                roster: true,
                member_count: true,
                ..Stale::default()
            },
        }
    }
}

/// Set of cached aggregates awaiting a refetch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stale {
    pub tenant: bool,
    pub notes: bool,
    pub roster: bool,
    pub member_count: bool,
}

impl Stale {
    pub fn all() -> Self {
        Self {
            tenant: true,
            notes: true,
            roster: true,
            member_count: true,
        }
    }

    pub fn merge(&mut self, other: Stale) {
        self.tenant |= other.tenant;
        self.notes |= other.notes;
        self.roster |= other.roster;
        self.member_count |= other.member_count;
    }

    pub fn is_clean(&self) -> bool {
        *self == Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn note_mutations_only_touch_notes() {
        for mutation in [Mutation::CreateNote, Mutation::UpdateNote, Mutation::DeleteNote] {
            let stale = mutation.invalidates();
            assert!(stale.notes);
            assert!(!stale.roster && !stale.member_count && !stale.tenant);
        }
    }

    #[test]
    fn invite_invalidates_roster_and_count() {
        let stale = Mutation::InviteMember.invalidates();
        assert!(stale.roster && stale.member_count);
        assert!(!stale.notes);
    }

    #[test]
    fn plan_change_leaves_tenant_plan_alone() {
        let stale = Mutation::ChangeMemberPlan.invalidates();
        assert!(stale.roster);
        assert!(!stale.tenant);
    }

    #[test]
    fn merge_accumulates() {
        let mut stale = Stale::default();
        assert!(stale.is_clean());
        stale.merge(Mutation::UpgradePlan.invalidates());
        stale.merge(Mutation::DeleteNote.invalidates());
        assert!(stale.tenant && stale.notes);
        assert!(!stale.is_clean());
        stale.merge(Mutation::SignIn.invalidates());
        assert_eq!(stale, Stale::all());
    }
}
