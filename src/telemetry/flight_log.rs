use anyhow::{Context, Result};
use chrono::Local;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::drone::FlightData;

const HEADER: &str = "Time,X,Y,Z,Yaw,FDHeight";

/// CSV trace of position and height, one row per telemetry snapshot.
pub struct FlightLog {
    out: Box<dyn Write + Send>,
}

impl FlightLog {
    /// Create (truncating) the log file and write the header row.
    pub fn create(path: &Path) -> Result<Self> {
        let file = File::create(path)
            .with_context(|| format!("cannot create flight log {}", path.display()))?;
        Self::from_writer(Box::new(BufWriter::new(file)))
            .with_context(|| format!("cannot write headers to flight log {}", path.display()))
    }

    pub fn from_writer(mut out: Box<dyn Write + Send>) -> Result<Self> {
        writeln!(out, "{HEADER}")?;
        out.flush()?;
        Ok(Self { out })
    }

    pub fn append(&mut self, data: &FlightData) -> Result<()> {
        let timestamp = Local::now().format("%H:%M:%S%.3f").to_string();
        self.append_at(&timestamp, data)
    }

    fn append_at(&mut self, timestamp: &str, data: &FlightData) -> Result<()> {
        writeln!(self.out, "{}", row(timestamp, data)).context("flight log write failed")?;
        self.out.flush().context("flight log flush failed")
    }
}

fn row(timestamp: &str, data: &FlightData) -> String {
    format!(
        "{timestamp},{:.6},{:.6},{:.6},{},{:.1}",
        data.mvo.position_x,
        data.mvo.position_y,
        data.mvo.position_z,
        data.imu.yaw,
        f32::from(data.height) / 10.0
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct SharedBuf(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().expect("buf lock").extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    struct Broken;

    impl Write for Broken {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "disk gone"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn header_then_rows() {
        let buf = SharedBuf::default();
        let mut log = FlightLog::from_writer(Box::new(buf.clone())).expect("log");
        let mut data = FlightData::default();
        data.height = 15;
        data.imu.yaw = -42;
        data.mvo.position_x = 1.25;
        log.append_at("12:34:56.789", &data).expect("append");
        let text = String::from_utf8(buf.0.lock().expect("buf lock").clone()).expect("utf8");
        assert_eq!(
            text,
            "Time,X,Y,Z,Yaw,FDHeight\n12:34:56.789,1.250000,0.000000,0.000000,-42,1.5\n"
        );
    }

    #[test]
    fn live_timestamp_has_millisecond_precision() {
        let buf = SharedBuf::default();
        let mut log = FlightLog::from_writer(Box::new(buf.clone())).expect("log");
        log.append(&FlightData::default()).expect("append");
        let text = String::from_utf8(buf.0.lock().expect("buf lock").clone()).expect("utf8");
        let stamp = text.lines().nth(1).and_then(|l| l.split(',').next()).expect("row");
        assert_eq!(stamp.len(), "HH:MM:SS.mmm".len());
        assert_eq!(stamp.as_bytes()[8], b'.');
    }

    #[test]
    fn write_failure_is_an_error() {
        assert!(FlightLog::from_writer(Box::new(Broken)).is_err());
    }
}
