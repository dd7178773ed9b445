mod compute;
mod query;
mod render;

pub use self::{compute::*, query::*, render::*};

use parking_lot::Mutex;
use thiserror::Error;

use crate::{
    api_log,
    global::Global,
    id::{self, markers, CommandBufferId, DeviceId, QuerySetId},
    resource::{ParentDevice, Resource},
    storage::InvalidId,
    FastHashSet, Label, LabelHelpers as _,
};

/// Lifecycle of a command buffer.
///
/// `Recording -> Finished -> Submitted` is the good path; `Discarded` can be
/// entered from `Recording` or `Finished`, and `Error` is where a buffer
/// whose recording failed structural validation lands at finish time.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum CommandEncoderStatus {
    Recording,
    Finished,
    Submitted,
    Discarded,
    Error,
}

/// One recorded operation. The log is append-only while recording and
/// immutable from `finish` on.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    WriteTimestamp {
        query_set_id: QuerySetId,
        query_index: u32,
    },
}

#[derive(Debug)]
pub(crate) struct CommandBufferMutable {
    pub(crate) status: CommandEncoderStatus,
    pub(crate) commands: Vec<Command>,
    /// First structural validation failure, latched so `finish` can report
    /// it. Recording continues past it; the buffer is simply unusable.
    pub(crate) pending_error: Option<QueryError>,
    /// Query sets referenced by recorded operations, re-checked for liveness
    /// at submission.
    pub(crate) used_query_sets: FastHashSet<QuerySetId>,
}

#[derive(Debug)]
pub struct CommandBuffer {
    pub(crate) device_id: DeviceId,
    label: String,
    pub(crate) data: Mutex<CommandBufferMutable>,
}

impl CommandBuffer {
    pub(crate) fn new(device_id: DeviceId, label: &Label) -> Self {
        Self {
            device_id,
            label: label.borrow_or_default().to_string(),
            data: Mutex::new(CommandBufferMutable {
                status: CommandEncoderStatus::Recording,
                commands: Vec::new(),
                pending_error: None,
                used_query_sets: FastHashSet::default(),
            }),
        }
    }
}

impl Resource for CommandBuffer {
    type Marker = markers::CommandBuffer;
    const TYPE: &'static str = "CommandBuffer";
    fn label(&self) -> &str {
        &self.label
    }
}

impl ParentDevice for CommandBuffer {
    fn device_id(&self) -> DeviceId {
        self.device_id
    }
}

#[derive(Clone, Debug, Error)]
#[non_exhaustive]
pub enum CommandEncoderError {
    #[error("command encoder {0:?} is invalid")]
    Invalid(id::CommandEncoderId),
    #[error("command encoder must be actively recording")]
    NotRecording,
    #[error("a recorded command failed validation")]
    RecordingFailed(#[source] Box<QueryError>),
}

impl Global {
    /// Seal the command buffer. If any recorded operation failed structural
    /// validation, the latched error is reported here and the buffer becomes
    /// unusable.
    pub fn command_encoder_finish(
        &self,
        encoder_id: id::CommandEncoderId,
    ) -> (CommandBufferId, Option<CommandEncoderError>) {
        profiling::scope!("CommandEncoder::finish");
        api_log!("CommandEncoder::finish {:?}", encoder_id);

        let hub = &self.hub;

        let cmd_buf = match hub.command_buffers.get(encoder_id) {
            Ok(cmd_buf) => cmd_buf,
            Err(_) => return (encoder_id, Some(CommandEncoderError::Invalid(encoder_id))),
        };
        let mut data = cmd_buf.data.lock();

        match data.status {
            CommandEncoderStatus::Recording => match data.pending_error.take() {
                None => {
                    data.status = CommandEncoderStatus::Finished;
                    (encoder_id, None)
                }
                Some(err) => {
                    data.status = CommandEncoderStatus::Error;
                    let error = CommandEncoderError::RecordingFailed(Box::new(err));
                    if let Ok(device) = hub.devices.get(cmd_buf.device_id) {
                        device.report_validation_error(&error);
                    }
                    (encoder_id, Some(error))
                }
            },
            _ => (encoder_id, Some(CommandEncoderError::NotRecording)),
        }
    }

    /// Give up on a command buffer without submitting it. Valid from
    /// `Recording` or `Finished`; anything else is left alone.
    pub fn command_encoder_discard(&self, encoder_id: id::CommandEncoderId) {
        profiling::scope!("CommandEncoder::discard");
        api_log!("CommandEncoder::discard {:?}", encoder_id);

        if let Ok(cmd_buf) = self.hub.command_buffers.get(encoder_id) {
            let mut data = cmd_buf.data.lock();
            match data.status {
                CommandEncoderStatus::Recording | CommandEncoderStatus::Finished => {
                    data.status = CommandEncoderStatus::Discarded;
                }
                _ => {}
            }
        }
    }

    /// Snapshot of the recorded operation log, in recording order. Failed
    /// operations are present too; the log is a trace, not a playback plan.
    pub fn command_buffer_commands(
        &self,
        command_buffer_id: CommandBufferId,
    ) -> Result<Vec<Command>, InvalidId> {
        let cmd_buf = self.hub.command_buffers.get(command_buffer_id)?;
        let data = cmd_buf.data.lock();
        Ok(data.commands.clone())
    }

    pub fn command_buffer_drop(&self, command_buffer_id: CommandBufferId) {
        profiling::scope!("CommandBuffer::drop");
        api_log!("CommandBuffer::drop {:?}", command_buffer_id);

        let _cmd_buf = self.hub.command_buffers.unregister(command_buffer_id);
    }
}
