use thiserror::Error;

use crate::{
    api_log,
    command::{Command, CommandEncoderError, CommandEncoderStatus},
    global::Global,
    id::{self, DeviceId, QuerySetId},
    resource::QuerySet,
    types::QueryKind,
};

/// Error encountered when dealing with queries
#[derive(Clone, Debug, Error)]
pub enum QueryError {
    #[error(transparent)]
    Encoder(#[from] CommandEncoderError),
    #[error("error encountered while trying to use queries")]
    Use(#[from] QueryUseError),
    #[error("QuerySet {0:?} is invalid or destroyed")]
    InvalidQuerySet(QuerySetId),
}

/// Error encountered while trying to use queries
#[derive(Clone, Debug, Error, PartialEq)]
pub enum QueryUseError {
    #[error("query {query_index} is out of bounds for a query set of size {query_set_size}")]
    OutOfBounds {
        query_index: u32,
        query_set_size: u32,
    },
    #[error("query set {query_set:?} belongs to device {set_device:?}, not the encoder's device {encoder_device:?}")]
    DeviceMismatch {
        query_set: QuerySetId,
        set_device: DeviceId,
        encoder_device: DeviceId,
    },
    #[error("a query of type {query_kind:?} was issued to a query set of type {set_kind:?}")]
    IncompatibleType {
        set_kind: QueryKind,
        query_kind: QueryKind,
    },
}

impl QuerySet {
    /// Structural validation for one query use: device affinity first, then
    /// set kind, then bounds.
    pub(crate) fn validate_query(
        &self,
        self_id: QuerySetId,
        encoder_device: DeviceId,
        query_kind: QueryKind,
        query_index: u32,
    ) -> Result<(), QueryUseError> {
        if self.device_id != encoder_device {
            return Err(QueryUseError::DeviceMismatch {
                query_set: self_id,
                set_device: self.device_id,
                encoder_device,
            });
        }

        if self.kind != query_kind {
            return Err(QueryUseError::IncompatibleType {
                set_kind: self.kind,
                query_kind,
            });
        }

        if query_index >= self.count {
            return Err(QueryUseError::OutOfBounds {
                query_index,
                query_set_size: self.count,
            });
        }

        Ok(())
    }
}

impl Global {
    /// Shared recording path for the three timestamp-write call sites
    /// (command encoder, compute pass, render pass).
    ///
    /// Structural failures are reported to the caller immediately and
    /// latched into the command buffer; the operation still joins the log,
    /// and recording stays open, so the buffer only becomes unusable at
    /// finish.
    pub(crate) fn record_write_timestamp(
        &self,
        encoder_id: id::CommandEncoderId,
        query_set_id: QuerySetId,
        query_index: u32,
    ) -> Result<(), QueryError> {
        let hub = &self.hub;

        let cmd_buf = hub
            .command_buffers
            .get(encoder_id)
            .map_err(|_| CommandEncoderError::Invalid(encoder_id))?;
        let mut data = cmd_buf.data.lock();

        match data.status {
            CommandEncoderStatus::Recording => {}
            _ => return Err(CommandEncoderError::NotRecording.into()),
        }

        data.commands.push(Command::WriteTimestamp {
            query_set_id,
            query_index,
        });

        let result = hub
            .query_sets
            .get(query_set_id)
            .map_err(|_| QueryError::InvalidQuerySet(query_set_id))
            .and_then(|query_set| {
                query_set
                    .validate_query(
                        query_set_id,
                        cmd_buf.device_id,
                        QueryKind::Timestamp,
                        query_index,
                    )
                    .map_err(QueryError::from)
            });

        match result {
            Ok(()) => {
                data.used_query_sets.insert(query_set_id);
                Ok(())
            }
            Err(err) => {
                if data.pending_error.is_none() {
                    data.pending_error = Some(err.clone());
                }
                Err(err)
            }
        }
    }

    pub fn command_encoder_write_timestamp(
        &self,
        encoder_id: id::CommandEncoderId,
        query_set_id: QuerySetId,
        query_index: u32,
    ) -> Result<(), QueryError> {
        profiling::scope!("CommandEncoder::write_timestamp");
        api_log!(
            "CommandEncoder::write_timestamp {:?} {:?}[{}]",
            encoder_id,
            query_set_id,
            query_index
        );

        self.record_write_timestamp(encoder_id, query_set_id, query_index)
    }
}
