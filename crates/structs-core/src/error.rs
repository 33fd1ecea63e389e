use crate::kind::Kind;

/// Failure of a field operation.
///
/// The first three variants are recoverable conditions of
/// [`Field::set`](crate::Field::set) and [`Field::zero`](crate::Field::zero).
/// [`PreconditionFailed`](FieldError::PreconditionFailed) is only produced by
/// the checked `try_*` accessors and reports a caller bug that the unchecked
/// accessors would have panicked on.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FieldError {
    #[error("field `{field}` is not exported")]
    NotExported { field: &'static str },

    /// The descriptor was reached from a detached (read-only) root.
    #[error("field `{field}` is not settable")]
    NotSettable { field: &'static str },

    #[error("field `{field}`: can't assign {offered} to {required}")]
    TypeMismatch {
        field: &'static str,
        offered: &'static str,
        required: &'static str,
    },

    #[error("field `{field}`: {violation}")]
    PreconditionFailed {
        field: &'static str,
        violation: Precondition,
    },
}

/// A contract an accessor requires of its caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Precondition {
    #[error("value of an unexported field cannot be read")]
    Unexported,

    #[error("kind `{kind}` is not a struct")]
    NotAStruct { kind: Kind },
}

impl FieldError {
    pub fn field(&self) -> &'static str {
        match self {
            Self::NotExported { field }
            | Self::NotSettable { field }
            | Self::TypeMismatch { field, .. }
            | Self::PreconditionFailed { field, .. } => *field,
        }
    }

    pub fn is_contract_violation(&self) -> bool {
        matches!(self, Self::PreconditionFailed { .. })
    }

    pub fn is_recoverable(&self) -> bool {
        !self.is_contract_violation()
    }
}
