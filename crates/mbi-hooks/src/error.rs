/// Errors raised by hooks. Any error aborts the commit.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum HookError {
    /// The hook refused the operation.
    #[error("hook '{hook}' rejected the operation: {reason}")]
    Rejected { hook: String, reason: String },

    /// The hook failed while running.
    #[error("hook '{hook}' failed: {message}")]
    Failed { hook: String, message: String },
}

impl HookError {
    pub fn rejected(hook: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Rejected {
            hook: hook.into(),
            reason: reason.into(),
        }
    }

    pub fn failed(hook: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Failed {
            hook: hook.into(),
            message: message.into(),
        }
    }
}

/// Convenience alias for hook results.
pub type HookResult<T> = Result<T, HookError>;
