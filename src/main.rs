#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]

/*
 * NMEA2S4C collects amplitude scintillation indices from GPS receivers.
 * Authors: Thomas Mazzi, Giuseppe Massimo Bertani et al.
 * This program is shipped under GNU General Public License V3.
 */

extern crate gnss_rs as gnss;

use env_logger::{Builder, Env, Target};

use log::{error, info};

use tokio::{signal, sync::watch};

use hifitime::prelude::{Epoch, TimeScale};

mod cli;
mod collecter;
mod cutoff;
mod device;
mod error;
mod nmea;
mod runtime;
mod scintillation;
mod utils;

use crate::{cli::Cli, device::Device, runtime::Runtime};

#[tokio::main]
pub async fn main() {
    let mut builder = Builder::from_env(Env::default().default_filter_or("info"));

    builder
        .target(Target::Stdout)
        .format_timestamp_secs()
        .format_module_path(false)
        .init();

    let t_utc = Epoch::now()
        .unwrap_or_else(|e| panic!("Failed to determine system time: {}", e))
        .to_time_scale(TimeScale::UTC);

    // cli
    let cli = Cli::new();

    // Input interface
    let mut device = if let Some(serial) = cli.serial_port() {
        // active mode (GNSS receiver)
        let baud_rate = cli.baud_rate().unwrap_or(9_600);

        Device::open_serial_port(serial, baud_rate, cli.timeout())
            .unwrap_or_else(|e| panic!("failed to open {}: {}", serial, e))
    } else {
        // passive mode (input files)
        let user_files = cli.filepaths();
        let total = user_files.len();

        assert!(
            total > 0,
            "invalid command line: requires either serial port or at least, one input file"
        );

        let mut device = Device::open_file(user_files[0])
            .unwrap_or_else(|e| panic!("failed to open {}: {}", user_files[0], e));

        for fullpath in user_files.iter().skip(1) {
            device
                .stack_file(fullpath)
                .unwrap_or_else(|e| panic!("failed to open {}: {}", fullpath, e));
        }

        device
    };

    let settings = cli.settings();
    let options = cli.options();

    info!(
        "{} - station \"{}\" deployed - {} - max sats: {} - top threshold: {}",
        t_utc,
        settings.name,
        settings.cutoff,
        settings.max_sats,
        settings.threshold
    );

    if let Some(prefix) = &settings.prefix {
        info!("{} - results are written in {}", t_utc, prefix);
    }

    // shutdown channel
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    tokio::spawn(async move {
        signal::ctrl_c()
            .await
            .unwrap_or_else(|e| panic!("Tokio signal handling error: {}", e));

        // acquisition may have completed already
        let _ = shutdown_tx.send(true);
    });

    // main task: bounded blocking reads
    let mut rtm = Runtime::new(settings, options, t_utc);

    let outcome = tokio::task::spawn_blocking(move || {
        let result = rtm.run(&mut device, &shutdown_rx);
        (rtm.releases, result)
    })
    .await
    .unwrap_or_else(|e| panic!("Tokio: acquisition task error: {}", e));

    match outcome {
        (releases, Ok(())) => {
            info!("{} epoch(s) released", releases);
        },
        (releases, Err(e)) => {
            error!("acquisition aborted after {} epoch(s): {}", releases, e);
            std::process::exit(1);
        },
    }
}
