use std::process;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use log::{info, warn};
use padprint::{
    bitmap, gadget, Canvas, Config, Error, HidGadget, InputReport, Planner, Transport, WriteStatus,
};

// backoff after a transport hiccup before trying again
const BACKOFF: Duration = Duration::from_secs(1);

static STOP: AtomicBool = AtomicBool::new(false);

extern "C" fn on_interrupt(_signum: libc::c_int) {
    STOP.store(true, Ordering::SeqCst);
}

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() != 2 {
        println!("usage: {} /path/to/2-color.bmp", args[0]);
        println!("       {} %                     (built-in test pattern)", args[0]);
        return;
    }

    // passing % uses the built-in test pattern, otherwise load a bitmap
    let canvas = if args[1] == "%" {
        Canvas::test_pattern()
    } else {
        match load(&args[1]) {
            Ok(canvas) => canvas,
            Err(err) => {
                eprintln!("{}", err);
                eprintln!("error: not continuing");
                process::exit(1);
            }
        }
    };
    info!("canvas ready, {} cells to draw", canvas.ink_count());

    unsafe {
        libc::signal(libc::SIGINT, on_interrupt as libc::sighandler_t);
    }

    let config = Config::from_env();
    let mut transport = match setup(&config) {
        Ok(transport) => transport,
        Err(err) => {
            eprintln!("gadget setup failed: {}", err);
            process::exit(1);
        }
    };

    let mut planner = Planner::new();
    run(&mut planner, &canvas, &mut transport, &config);

    // send an empty report to prevent stuck inputs after exiting the loop
    transport.write_report(&InputReport::neutral().to_bytes(), config.timeout());
}

fn load(path: &str) -> Result<Canvas, Error> {
    let data = std::fs::read(path)?;
    Ok(bitmap::decode(&data)?)
}

fn setup(config: &Config) -> Result<HidGadget, Error> {
    gadget::configure(config.configfs())?;
    gadget::bind(config.configfs())?;
    HidGadget::open(config.device())
}

fn run<T: Transport>(planner: &mut Planner, canvas: &Canvas, transport: &mut T, config: &Config) {
    while !STOP.load(Ordering::SeqCst) {
        let intent = match planner.tick(canvas) {
            Some(intent) => intent,
            None => {
                info!("printing completed");
                break;
            }
        };
        let report = InputReport::from_intent(&intent);
        match transport.write_report(&report.to_bytes(), config.timeout()) {
            WriteStatus::Ok => {}
            WriteStatus::NotEnumerated => {
                info!("waiting for connection");
                thread::sleep(BACKOFF);
                planner.reset();
                continue;
            }
            WriteStatus::IoError(code) => {
                warn!("write error ({:08x})", code);
                thread::sleep(BACKOFF);
            }
        }
        thread::sleep(config.wait());
    }
}
