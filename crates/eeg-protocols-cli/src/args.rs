use std::path::PathBuf;

use clap::Args;

use eeg_protocols::board::{ConnectionParams, StreamSettings};
use eeg_protocols::recording::RecordingLabel;

/// Board connection flags; check the SDK docs for which ones a board needs
/// (e.g. `--serial-port` for the Cyton).
#[derive(Args, Debug, Clone)]
pub struct ConnectionArgs {
    /// Board id, check the SDK docs for the list of supported boards (-1: built-in synthetic board)
    #[arg(long, allow_negative_numbers = true)]
    pub board_id: i32,

    /// Timeout for device discovery or connection, in seconds
    #[arg(long, default_value_t = 0)]
    pub timeout: u32,

    /// IP port
    #[arg(long, default_value_t = 0)]
    pub ip_port: u16,

    /// IP protocol, check the SDK's IpProtocolType enum
    #[arg(long, default_value_t = 0)]
    pub ip_protocol: i32,

    /// IP address
    #[arg(long, default_value = "")]
    pub ip_address: String,

    /// Serial port, e.g. /dev/ttyUSB0
    #[arg(long, default_value = "")]
    pub serial_port: String,

    /// MAC address
    #[arg(long, default_value = "")]
    pub mac_address: String,

    /// Other info
    #[arg(long, default_value = "")]
    pub other_info: String,

    /// Streamer params, e.g. file://stream.csv:w
    #[arg(long, default_value = "")]
    pub streamer_params: String,

    /// Serial number
    #[arg(long, default_value = "")]
    pub serial_number: String,

    /// Input file (playback boards)
    #[arg(long, default_value = "")]
    pub file: String,
}

impl ConnectionArgs {
    #[must_use]
    pub fn params(&self) -> ConnectionParams {
        ConnectionParams {
            board_id: self.board_id,
            timeout: self.timeout,
            ip_port: self.ip_port,
            ip_protocol: self.ip_protocol,
            ip_address: self.ip_address.clone(),
            serial_port: self.serial_port.clone(),
            mac_address: self.mac_address.clone(),
            other_info: self.other_info.clone(),
            serial_number: self.serial_number.clone(),
            file: self.file.clone(),
        }
    }

    #[must_use]
    pub fn stream_settings(&self, ring_buffer_size: usize) -> StreamSettings {
        StreamSettings {
            ring_buffer_size,
            streamer_params: self.streamer_params.clone(),
        }
    }
}

/// Flags shared by both experiment runners.
#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    #[command(flatten)]
    pub connection: ConnectionArgs,

    /// Subject id (empty: unset, generic file name)
    #[arg(long, default_value = "unknown")]
    pub sub: String,

    /// Substance name (empty: unset, generic file name)
    #[arg(long, default_value = "sober")]
    pub drug: String,

    /// Path to eeg-protocols.toml config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Directory recordings are written to (overrides config)
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Sound file played as the cue (overrides config)
    #[arg(long)]
    pub cue_file: Option<PathBuf>,

    /// Do not play the cue sound
    #[arg(long)]
    pub mute: bool,

    /// Enable verbose logging (set RUST_LOG for fine-grained control)
    #[arg(short, long)]
    pub verbose: bool,
}

impl RunArgs {
    #[must_use]
    pub fn label(&self) -> RecordingLabel {
        RecordingLabel::new(Some(self.sub.clone()), Some(self.drug.clone()))
    }
}
