use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// A source of periodic refresh signals. `begin` arms the signal; dropping
/// the returned handle disarms it.
pub trait Refresh {
    type Handle;

    fn begin(&mut self, interval_ms: u64) -> Self::Handle;
}

enum PumpCtl {
    Start(u64),
    Stop,
    Quit,
}

/// Background thread that calls `notify` every interval while armed.
pub struct Pump {
    ctl: Sender<PumpCtl>,
    thread: JoinHandle<()>,
}

/// Armed pump. Disarms when dropped.
pub struct PumpHandle {
    ctl: Sender<PumpCtl>,
}

impl Drop for PumpHandle {
    fn drop(&mut self) {
        self.ctl.send(PumpCtl::Stop).ok();
    }
}

impl Pump {
    /// `notify` returns false once nobody is listening, which ends the thread.
    pub fn spawn<F>(notify: F) -> std::io::Result<Self>
    where
        F: FnMut() -> bool + Send + 'static,
    {
        let (ctl, rx) = mpsc::channel();
        let thread = thread::Builder::new()
            .name("pump".into())
            .spawn(move || pump_thread(rx, notify))?;
        Ok(Self { ctl, thread })
    }

    pub fn shutdown(self) {
        self.ctl.send(PumpCtl::Quit).ok();
        if self.thread.join().is_err() {
            log::error!("pump thread panicked");
        }
    }
}

impl Refresh for Pump {
    type Handle = PumpHandle;

    fn begin(&mut self, interval_ms: u64) -> PumpHandle {
        self.ctl.send(PumpCtl::Start(interval_ms)).ok();
        PumpHandle {
            ctl: self.ctl.clone(),
        }
    }
}

fn pump_thread<F: FnMut() -> bool>(rx: Receiver<PumpCtl>, mut notify: F) {
    let mut interval: Option<Duration> = None;

    loop {
        // Block while disarmed, wait out the interval while armed
        let ctl = match interval {
            Some(every) => match rx.recv_timeout(every) {
                Ok(ctl) => ctl,
                Err(RecvTimeoutError::Timeout) => {
                    if !notify() {
                        break;
                    }
                    continue;
                }
                Err(RecvTimeoutError::Disconnected) => break,
            },
            None => match rx.recv() {
                Ok(ctl) => ctl,
                Err(_) => break,
            },
        };

        match ctl {
            PumpCtl::Start(interval_ms) => {
                interval = Some(Duration::from_millis(interval_ms.max(1)));
            }
            PumpCtl::Stop => interval = None,
            PumpCtl::Quit => break,
        }
    }
    log::debug!("pump thread exiting");
}

#[cfg(test)]
mod tests {
    use super::*;

    const WAIT: Duration = Duration::from_secs(5);

    #[test]
    fn test_pump_ticks_while_armed() {
        let (tx, ticks) = mpsc::channel();
        let mut pump = Pump::spawn(move || tx.send(()).is_ok()).unwrap();

        let handle = pump.begin(2);
        ticks.recv_timeout(WAIT).unwrap();
        ticks.recv_timeout(WAIT).unwrap();
        drop(handle);

        pump.shutdown();
        // The thread is gone, so the sender is too
        while ticks.try_recv().is_ok() {}
        assert_eq!(
            ticks.recv_timeout(Duration::from_millis(20)),
            Err(RecvTimeoutError::Disconnected)
        );
    }

    #[test]
    fn test_pump_idle_until_armed() {
        let (tx, ticks) = mpsc::channel();
        let pump = Pump::spawn(move || tx.send(()).is_ok()).unwrap();
        assert_eq!(
            ticks.recv_timeout(Duration::from_millis(30)),
            Err(RecvTimeoutError::Timeout)
        );
        pump.shutdown();
    }

    #[test]
    fn test_pump_exits_when_listener_gone() {
        let (tx, ticks) = mpsc::channel::<()>();
        drop(ticks);
        let mut pump = Pump::spawn(move || tx.send(()).is_ok()).unwrap();
        let _handle = pump.begin(1);
        // First notify fails and the thread ends on its own
        pump.thread.join().unwrap();
    }
}
