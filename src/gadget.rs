//! USB gadget transport.
//!
//! The console side of the link: a configfs gadget tree that enumerates as
//! a HORI Pokken pad, and the `/dev/hidgN` character device the input
//! reports go out through.

use log::{debug, info};
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::os::unix::fs::{symlink, OpenOptionsExt};
use std::os::unix::io::AsRawFd;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::{error::Error, report::REPORT_DESCRIPTOR, REPORT_SIZE};

// The console only talks to controllers it recognizes, so enumerate with
// the HORI Pokken pad identity.
const VENDOR_ID: u16 = 0x0F0D;
const PRODUCT_ID: u16 = 0x0092;
const DEVICE_VERSION: u16 = 0x0100;
const MANUFACTURER: &str = "HORI CO.,LTD.";
const PRODUCT: &str = "POKKEN CONTROLLER";

const GADGET_NAME: &str = "pad-print";

/// Runtime configuration.
///
/// Read from the environment (`.env` files are honored):
/// `PADPRINT_DEVICE`, `PADPRINT_CONFIGFS`, `PADPRINT_WAIT_MS`,
/// `PADPRINT_TIMEOUT_MS`.
#[derive(Debug, Clone)]
pub struct Config {
    device: PathBuf,
    configfs: PathBuf,
    wait: Duration,
    timeout: Duration,
}

impl Config {
    pub fn from_env() -> Config {
        dotenvy::dotenv().ok();
        Config {
            device: std::env::var_os("PADPRINT_DEVICE")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("/dev/hidg0")),
            configfs: std::env::var_os("PADPRINT_CONFIGFS")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("/sys/kernel/config")),
            // time between reports: too high = repeated inputs, too low =
            // skipped inputs. 24 seems fine although a few inputs might
            // still get skipped.
            wait: Duration::from_millis(env_ms("PADPRINT_WAIT_MS", 24)),
            timeout: Duration::from_millis(env_ms("PADPRINT_TIMEOUT_MS", 33)),
        }
    }

    pub fn with_device<P: Into<PathBuf>>(self, device: P) -> Self {
        Config {
            device: device.into(),
            ..self
        }
    }

    pub fn with_wait(self, wait: Duration) -> Self {
        Config { wait, ..self }
    }

    pub fn with_timeout(self, timeout: Duration) -> Self {
        Config { timeout, ..self }
    }

    pub fn device(&self) -> &Path {
        &self.device
    }

    pub fn configfs(&self) -> &Path {
        &self.configfs
    }

    pub fn wait(&self) -> Duration {
        self.wait
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

fn env_ms(key: &str, default: u64) -> u64 {
    match std::env::var(key) {
        Ok(value) => value.parse().unwrap_or(default),
        Err(_) => default,
    }
}

/// Result of pushing one report at the console.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteStatus {
    Ok,
    /// No host has configured the gadget yet — console off, asleep, or
    /// cable out. The caller restarts calibration once this clears.
    NotEnumerated,
    /// Transient I/O failure, carried as the raw errno. Logged and
    /// retried, never fatal.
    IoError(i32),
}

/// The one operation the drawing loop needs from the transport.
pub trait Transport {
    fn write_report(&mut self, report: &[u8; REPORT_SIZE], timeout: Duration) -> WriteStatus;
}

pub struct HidGadget {
    device: File,
}

impl HidGadget {
    /// Open the gadget character device, non-blocking.
    pub fn open(path: &Path) -> Result<Self, Error> {
        let device = OpenOptions::new()
            .write(true)
            .custom_flags(libc::O_NONBLOCK)
            .open(path)?;
        info!("opened gadget device {}", path.display());
        Ok(HidGadget { device })
    }
}

impl Transport for HidGadget {
    fn write_report(&mut self, report: &[u8; REPORT_SIZE], timeout: Duration) -> WriteStatus {
        let mut pollfd = libc::pollfd {
            fd: self.device.as_raw_fd(),
            events: libc::POLLOUT,
            revents: 0,
        };
        let ready = unsafe { libc::poll(&mut pollfd, 1, timeout.as_millis() as libc::c_int) };
        if ready < 0 {
            return classify(std::io::Error::last_os_error());
        }
        if ready == 0 {
            // host did not drain the endpoint within the deadline
            return WriteStatus::IoError(libc::ETIMEDOUT);
        }
        match self.device.write(report) {
            Ok(n) if n == report.len() => WriteStatus::Ok,
            Ok(n) => {
                debug!("short report write ({} of {} bytes)", n, report.len());
                WriteStatus::IoError(0)
            }
            Err(err) => classify(err),
        }
    }
}

fn classify(err: std::io::Error) -> WriteStatus {
    match err.raw_os_error() {
        Some(libc::ESHUTDOWN) | Some(libc::ENODEV) => WriteStatus::NotEnumerated,
        Some(code) => WriteStatus::IoError(code),
        None => WriteStatus::IoError(0),
    }
}

/// Create the configfs gadget tree.
///
/// Safe to run over a tree left behind by an earlier run; attribute files
/// are rewritten and the existing function link is kept.
pub fn configure(configfs: &Path) -> Result<(), Error> {
    let root = configfs.join("usb_gadget").join(GADGET_NAME);
    let strings = root.join("strings/0x409");
    let config = root.join("configs/c.1");
    let function = root.join("functions/hid.usb0");

    debug!("configuring gadget under {}", root.display());
    fs::create_dir_all(&strings)?;
    fs::create_dir_all(config.join("strings/0x409"))?;
    fs::create_dir_all(&function)?;

    fs::write(root.join("idVendor"), format!("0x{:04x}", VENDOR_ID))?;
    fs::write(root.join("idProduct"), format!("0x{:04x}", PRODUCT_ID))?;
    fs::write(root.join("bcdDevice"), format!("0x{:04x}", DEVICE_VERSION))?;
    fs::write(root.join("bcdUSB"), "0x0200")?;
    fs::write(strings.join("manufacturer"), MANUFACTURER)?;
    fs::write(strings.join("product"), PRODUCT)?;
    fs::write(strings.join("serialnumber"), "")?;
    fs::write(config.join("strings/0x409/configuration"), PRODUCT)?;
    fs::write(config.join("MaxPower"), "500")?;

    fs::write(function.join("protocol"), "0")?;
    fs::write(function.join("subclass"), "0")?;
    fs::write(function.join("report_length"), REPORT_SIZE.to_string())?;
    fs::write(function.join("report_desc"), REPORT_DESCRIPTOR)?;

    let link = config.join("hid.usb0");
    if !link.exists() {
        symlink(&function, &link)?;
    }
    Ok(())
}

/// Bind the gadget to the first available UDC, making it visible to the
/// console. A no-op when already bound.
pub fn bind(configfs: &Path) -> Result<(), Error> {
    let root = configfs.join("usb_gadget").join(GADGET_NAME);
    let current = fs::read_to_string(root.join("UDC")).unwrap_or_default();
    if !current.trim().is_empty() {
        debug!("gadget already bound to {}", current.trim());
        return Ok(());
    }
    let udc = first_udc()?;
    info!("binding gadget to {}", udc);
    fs::write(root.join("UDC"), &udc)?;
    Ok(())
}

fn first_udc() -> Result<String, Error> {
    for entry in fs::read_dir("/sys/class/udc")? {
        let entry = entry?;
        if let Ok(name) = entry.file_name().into_string() {
            return Ok(name);
        }
    }
    Err(Error::NoUdc)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_not_enumerated() {
        let status = classify(std::io::Error::from_raw_os_error(libc::ESHUTDOWN));
        assert_eq!(status, WriteStatus::NotEnumerated);
        let status = classify(std::io::Error::from_raw_os_error(libc::ENODEV));
        assert_eq!(status, WriteStatus::NotEnumerated);
    }

    #[test]
    fn test_classify_other_errno_is_io_error() {
        let status = classify(std::io::Error::from_raw_os_error(libc::EPIPE));
        assert_eq!(status, WriteStatus::IoError(libc::EPIPE));
    }

    #[test]
    fn test_config_builders() {
        let config = Config::from_env()
            .with_device("/dev/hidg7")
            .with_wait(Duration::from_millis(10))
            .with_timeout(Duration::from_millis(5));
        assert_eq!(config.device(), Path::new("/dev/hidg7"));
        assert_eq!(config.wait(), Duration::from_millis(10));
        assert_eq!(config.timeout(), Duration::from_millis(5));
    }
}
