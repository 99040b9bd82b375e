use failsafe::{backoff, failure_policy, Config, StateMachine};
use std::time::Duration;

/// Circuit breaker guarding calls to the backend auth service.
pub type AuthCircuitBreaker =
    StateMachine<failure_policy::ConsecutiveFailures<backoff::Exponential>, ()>;

/// Consecutive failures that open the circuit.
pub const AUTH_FAILURE_THRESHOLD: u32 = 5;

/// Creates a circuit breaker for session lookups so that an unavailable auth
/// service fails route guards fast instead of stalling every request.
///
/// # Configuration
///
/// - **Failure threshold**: 5 consecutive failures triggers OPEN state.
/// - **Backoff**: Exponential backoff from 10s to 60s before attempting recovery.
///
/// # States
///
/// - **CLOSED**: Normal operation, requests pass through.
/// - **OPEN**: Too many failures, requests fail fast.
/// - **HALF_OPEN**: Testing if service recovered.
pub fn create_auth_circuit_breaker() -> AuthCircuitBreaker {
    let backoff_strategy = backoff::exponential(
        Duration::from_secs(10), // Initial delay
        Duration::from_secs(60), // Maximum delay
    );

    let failure_policy =
        failure_policy::consecutive_failures(AUTH_FAILURE_THRESHOLD, backoff_strategy);

    Config::new().failure_policy(failure_policy).build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use failsafe::{CircuitBreaker, Error};

    #[test]
    fn test_circuit_breaker_opens_after_failures() {
        let cb = create_auth_circuit_breaker();

        for _ in 0..AUTH_FAILURE_THRESHOLD {
            let result: Result<(), Error<&str>> = cb.call(|| Err::<(), &str>("auth down"));
            assert!(result.is_err());
        }

        let result: Result<(), Error<&str>> = cb.call(|| Ok::<(), &str>(()));

        match result {
            Err(Error::Rejected) => {}
            _ => panic!("Expected circuit to be open and reject requests"),
        }
    }

    #[test]
    fn test_ignored_errors_do_not_open_circuit() {
        let cb = create_auth_circuit_breaker();

        for _ in 0..(AUTH_FAILURE_THRESHOLD * 2) {
            let result: Result<(), Error<&str>> =
                cb.call_with(|_: &&str| false, || Err::<(), &str>("expired token"));
            assert!(matches!(result, Err(Error::Inner("expired token"))));
        }

        assert!(cb.is_call_permitted());
    }
}
