//! Driver-mode arbitration.
//!
//! The server is the only authority on who drives. The client keeps a belief
//! (`is_driver_available`) that each `updateRoverState` push overwrites, and
//! when the seat falls vacant while the user sits on a driving view it asks
//! for the seat again. That request races other clients; the next push
//! settles it.

use crate::error::AcquisitionTimeoutError;
use rover_core::{ClientId, Driver};
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::{self, MissedTickBehavior};

/// Outcome of one driver push.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// This client is the driver.
    Driving,
    /// Seat is free and the user is not on a driving view.
    Vacant,
    /// Seat is free and the user is on a driving view: request it.
    Reacquire,
    /// Another client is driving.
    HeldBy(ClientId),
}

impl Decision {
    pub fn is_driver_available(self) -> bool {
        matches!(self, Decision::Driving | Decision::Vacant)
    }
}

/// Apply one `currentDriverId` push. Depends on nothing but its arguments.
pub fn decide(driver: Driver, me: ClientId, on_driving_view: bool) -> Decision {
    match driver {
        _ if driver.is(me) => Decision::Driving,
        Driver::Vacant if on_driving_view => Decision::Reacquire,
        Driver::Vacant => Decision::Vacant,
        Driver::Client(id) => Decision::HeldBy(id),
    }
}

/// Wait until the server has assigned a client id.
///
/// Checks the id every `poll` and gives up after `timeout`, whichever comes
/// first. Both timers live in this future, so they are gone once it resolves
/// or is dropped.
pub async fn wait_for_client_id(
    identity: watch::Receiver<ClientId>,
    poll: Duration,
    timeout: Duration,
) -> Result<ClientId, AcquisitionTimeoutError> {
    let mut ticker = time::interval(poll);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let deadline = time::sleep(timeout);
    tokio::pin!(deadline);

    loop {
        tokio::select! {
            _ = &mut deadline => {
                return Err(AcquisitionTimeoutError { waited: timeout });
            }
            _ = ticker.tick() => {
                let id = *identity.borrow();
                if id.is_assigned() {
                    return Ok(id);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::Instant;

    const ME: ClientId = ClientId::new(5001);
    const OTHER: ClientId = ClientId::new(5002);

    #[test]
    fn policy() {
        assert_eq!(decide(Driver::Client(ME), ME, true), Decision::Driving);
        assert_eq!(decide(Driver::Client(ME), ME, false), Decision::Driving);
        assert_eq!(decide(Driver::Vacant, ME, true), Decision::Reacquire);
        assert_eq!(decide(Driver::Vacant, ME, false), Decision::Vacant);
        assert_eq!(
            decide(Driver::Client(OTHER), ME, true),
            Decision::HeldBy(OTHER)
        );
    }

    #[test]
    fn availability() {
        assert!(Decision::Driving.is_driver_available());
        assert!(Decision::Vacant.is_driver_available());
        assert!(!Decision::Reacquire.is_driver_available());
        assert!(!Decision::HeldBy(OTHER).is_driver_available());
    }

    #[tokio::test(start_paused = true)]
    async fn resolves_once_id_arrives() {
        let (tx, rx) = watch::channel(ClientId::UNASSIGNED);
        let wait = tokio::spawn(wait_for_client_id(
            rx,
            Duration::from_millis(100),
            Duration::from_millis(1000),
        ));

        time::sleep(Duration::from_millis(350)).await;
        tx.send_replace(ME);

        assert_eq!(wait.await.unwrap(), Ok(ME));
    }

    #[tokio::test(start_paused = true)]
    async fn times_out_without_id() {
        let (_tx, rx) = watch::channel(ClientId::UNASSIGNED);
        let started = Instant::now();

        let result =
            wait_for_client_id(rx, Duration::from_millis(100), Duration::from_millis(1000)).await;

        assert_eq!(
            result,
            Err(AcquisitionTimeoutError {
                waited: Duration::from_millis(1000)
            })
        );
        assert!(started.elapsed() >= Duration::from_millis(1000));
    }

    #[tokio::test(start_paused = true)]
    async fn assigned_id_resolves_immediately() {
        let (_tx, rx) = watch::channel(ME);
        let started = Instant::now();

        let result =
            wait_for_client_id(rx, Duration::from_millis(100), Duration::from_millis(1000)).await;

        assert_eq!(result, Ok(ME));
        assert!(started.elapsed() < Duration::from_millis(100));
    }
}
