use desk_commands::ChangeAction;
use desk_directory::GroupAttr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Which set of a group a batch reconciles against.
pub enum TargetSet {
    Members,
    Owners,
}

impl TargetSet {
    pub fn attr(&self) -> GroupAttr {
        match self {
            Self::Members => GroupAttr::Members,
            Self::Owners => GroupAttr::Owners,
        }
    }

    /// Noun with its indefinite article, for transcript wording.
    pub fn noun_with_article(&self) -> &'static str {
        match self {
            Self::Members => "a member",
            Self::Owners => "an owner",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Outcome of applying one change command against the working set.
pub enum ChangeResult {
    Applied {
        action: ChangeAction,
        target: String,
    },
    AlreadyPresent {
        target: String,
    },
    AlreadyAbsent {
        target: String,
    },
    UnresolvedIdentity {
        action: ChangeAction,
        target: String,
    },
    SelfReferenceRejected {
        target: String,
    },
    UnrecognizedAction {
        keyword: String,
    },
    /// The directory refused the mutation; the line failed but the
    /// batch continues and the changed flag is untouched.
    MutationFailed {
        action: ChangeAction,
        target: String,
    },
    /// The line did not match the two-token shape; the batch stopped.
    StructuralFailure {
        line: String,
    },
}

impl ChangeResult {
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied { .. })
    }
}
