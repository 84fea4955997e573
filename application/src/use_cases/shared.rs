//! Helpers shared across use cases.

use crate::use_cases::orchestrate::OrchestrateError;
use tokio_util::sync::CancellationToken;

/// Return `Err(Cancelled)` if the optional token has been triggered.
pub(crate) fn check_cancelled(token: &Option<CancellationToken>) -> Result<(), OrchestrateError> {
    if let Some(token) = token
        && token.is_cancelled()
    {
        return Err(OrchestrateError::Cancelled);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_cancelled_none() {
        assert!(check_cancelled(&None).is_ok());
    }

    #[test]
    fn test_check_cancelled_triggered() {
        let token = CancellationToken::new();
        token.cancel();
        let result = check_cancelled(&Some(token));
        assert!(matches!(result, Err(OrchestrateError::Cancelled)));
    }
}
