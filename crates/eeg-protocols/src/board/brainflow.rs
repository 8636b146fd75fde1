//! Hardware boards through the BrainFlow SDK.
//!
//! Thin adapter from [`ConnectionParams`] to `BoardShim`; SDK errors are
//! mapped onto the lifecycle phase they happened in.

use brainflow::board_shim::{self, BoardShim};
use brainflow::brainflow_input_params::BrainFlowInputParamsBuilder;
use brainflow::{BoardIds, BrainFlowPresets, IpProtocolTypes};
use ndarray::Array2;
use num_traits::FromPrimitive;

use super::{BoardSession, ConnectionParams};
use crate::error::{ProtocolError, ProtocolResult};

pub struct BrainFlowBoard {
    board_id: i32,
    shim: BoardShim,
}

impl BrainFlowBoard {
    /// Build the SDK handle; nothing is opened until `prepare_session`.
    pub fn new(params: &ConnectionParams) -> ProtocolResult<Self> {
        let connection_failed = |reason: String| ProtocolError::ConnectionFailed {
            board_id: params.board_id,
            reason,
        };

        if let Err(e) = board_shim::enable_dev_board_logger() {
            tracing::debug!(error = ?e, "Could not enable BrainFlow dev logger");
        }

        let board = BoardIds::from_i32(params.board_id)
            .ok_or_else(|| connection_failed("unknown BrainFlow board id".into()))?;
        let ip_protocol = IpProtocolTypes::from_i32(params.ip_protocol)
            .ok_or_else(|| connection_failed(format!("unknown ip protocol {}", params.ip_protocol)))?;

        let input = BrainFlowInputParamsBuilder::default()
            .serial_port(params.serial_port.as_str())
            .mac_address(params.mac_address.as_str())
            .ip_address(params.ip_address.as_str())
            .ip_port(usize::from(params.ip_port))
            .ip_protocol(ip_protocol)
            .other_info(params.other_info.as_str())
            .timeout(params.timeout as usize)
            .serial_number(params.serial_number.as_str())
            .file(params.file.as_str())
            .build();

        let shim = BoardShim::new(board, input).map_err(|e| connection_failed(format!("{e:?}")))?;
        Ok(Self {
            board_id: params.board_id,
            shim,
        })
    }
}

fn stream_failed(e: impl std::fmt::Debug) -> ProtocolError {
    ProtocolError::StreamFailed {
        reason: format!("{e:?}"),
    }
}

impl BoardSession for BrainFlowBoard {
    fn board_id(&self) -> i32 {
        self.board_id
    }

    fn prepare_session(&mut self) -> ProtocolResult<()> {
        self.shim
            .prepare_session()
            .map_err(|e| ProtocolError::ConnectionFailed {
                board_id: self.board_id,
                reason: format!("{e:?}"),
            })
    }

    fn start_stream(
        &mut self,
        ring_buffer_size: usize,
        streamer_params: &str,
    ) -> ProtocolResult<()> {
        self.shim
            .start_stream(ring_buffer_size, streamer_params)
            .map_err(stream_failed)
    }

    fn insert_marker(&mut self, value: f64) -> ProtocolResult<()> {
        self.shim
            .insert_marker(value, BrainFlowPresets::DefaultPreset)
            .map_err(|e| ProtocolError::MarkerFailed {
                value,
                reason: format!("{e:?}"),
            })
    }

    fn get_board_data(&mut self) -> ProtocolResult<Array2<f64>> {
        let data = self
            .shim
            .get_board_data(None, BrainFlowPresets::DefaultPreset)
            .map_err(stream_failed)?;
        // Rebuilt from the raw values so the SDK's ndarray version does not leak.
        let (rows, cols) = data.dim();
        let values: Vec<f64> = data.iter().copied().collect();
        Array2::from_shape_vec((rows, cols), values).map_err(stream_failed)
    }

    fn stop_stream(&mut self) -> ProtocolResult<()> {
        self.shim.stop_stream().map_err(stream_failed)
    }

    fn release_session(&mut self) -> ProtocolResult<()> {
        self.shim.release_session().map_err(stream_failed)
    }
}
