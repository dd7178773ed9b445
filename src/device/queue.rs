use thiserror::Error;

use crate::{
    api_log,
    command::CommandEncoderStatus,
    device::DeviceError,
    global::Global,
    id::{self, CommandBufferId, QuerySetId},
    FastHashSet, SubmissionIndex,
};

#[derive(Clone, Debug, Error, PartialEq)]
#[non_exhaustive]
pub enum QueueSubmitError {
    #[error(transparent)]
    Queue(#[from] DeviceError),
    #[error("command buffer {0:?} is invalid, already submitted, or not finished")]
    InvalidCommandBuffer(CommandBufferId),
    #[error("command buffer {0:?} belongs to a different device than the queue")]
    DeviceMismatch(CommandBufferId),
    #[error("QuerySet {0:?} was destroyed before the command buffer referencing it was submitted")]
    DestroyedQuerySet(QuerySetId),
}

impl Global {
    /// Submit finished command buffers to the device's queue.
    ///
    /// Structural validity was settled when each buffer was finished; what
    /// gets re-checked here is liveness of every query set the recorded
    /// operations reference, since destruction may have raced the window
    /// between finish and submit. All buffers are validated before any is
    /// marked submitted, so a failed submission leaves every buffer in its
    /// prior state.
    pub fn queue_submit(
        &self,
        queue_id: id::QueueId,
        command_buffer_ids: &[CommandBufferId],
    ) -> Result<SubmissionIndex, QueueSubmitError> {
        profiling::scope!("Queue::submit");
        api_log!("Queue::submit {:?} {:?}", queue_id, command_buffer_ids);

        let hub = &self.hub;

        let device = hub
            .devices
            .get(queue_id)
            .map_err(|_| DeviceError::Invalid)?;

        let result = (|| {
            let mut seen = FastHashSet::default();
            let mut command_buffers = Vec::with_capacity(command_buffer_ids.len());
            for &cmb_id in command_buffer_ids {
                // A buffer submits at most once, including within one call.
                if !seen.insert(cmb_id) {
                    return Err(QueueSubmitError::InvalidCommandBuffer(cmb_id));
                }
                let cmd_buf = hub
                    .command_buffers
                    .get(cmb_id)
                    .map_err(|_| QueueSubmitError::InvalidCommandBuffer(cmb_id))?;
                if cmd_buf.device_id != queue_id {
                    return Err(QueueSubmitError::DeviceMismatch(cmb_id));
                }
                command_buffers.push((cmb_id, cmd_buf));
            }

            // Every buffer's lock is held from validation through marking,
            // so no concurrent submission or discard can slip into the
            // window in between. Acquisition follows the global id order;
            // overlapping submissions cannot deadlock.
            command_buffers.sort_unstable_by_key(|&(cmb_id, _)| cmb_id);
            let mut guards = Vec::with_capacity(command_buffers.len());
            for &(cmb_id, ref cmd_buf) in command_buffers.iter() {
                guards.push((cmb_id, cmd_buf.data.lock()));
            }

            for (cmb_id, data) in guards.iter() {
                match data.status {
                    CommandEncoderStatus::Finished => {}
                    _ => return Err(QueueSubmitError::InvalidCommandBuffer(*cmb_id)),
                }
                for &query_set_id in data.used_query_sets.iter() {
                    if !hub.query_sets.is_valid(query_set_id) {
                        return Err(QueueSubmitError::DestroyedQuerySet(query_set_id));
                    }
                }
            }

            for (_, data) in guards.iter_mut() {
                data.status = CommandEncoderStatus::Submitted;
            }

            Ok(device.next_submission_index())
        })();

        if let Err(ref err) = result {
            device.report_validation_error(err);
        }
        result
    }
}
