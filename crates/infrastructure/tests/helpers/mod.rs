#![allow(dead_code)]
mod http_server_mock;

pub use http_server_mock::{MockHttpServer, MockRoute};

use std::io::Write;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Polls `check` until it holds or `timeout` elapses.
pub async fn wait_until<F: Fn() -> bool>(check: F, timeout: Duration) -> bool {
    let deadline = tokio::time::Instant::now() + timeout;
    while tokio::time::Instant::now() < deadline {
        if check() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    check()
}

pub const HOSTS_LIST: &str = "\
# test hosts list
0.0.0.0 ads.remote.example
0.0.0.0 tracker.remote.example
127.0.0.1 localhost
";

pub const ADBLOCK_LIST: &str = "\
[Adblock Plus 2.0]
! Title: test list
||banner.adblock.example^
||pixel.adblock.example^$third-party
@@||allowed.adblock.example^
";

/// In-memory writer for asserting on formatted log output.
#[derive(Clone, Default)]
pub struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl CapturedLogs {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}
