use crate::{
    api_log,
    command::QueryError,
    global::Global,
    id::{self, QuerySetId},
    Label, LabelHelpers as _,
};

#[derive(Clone, Debug, Default)]
pub struct ComputePassDescriptor<'a> {
    pub label: Label<'a>,
}

/// A compute-pass recorder. The pass records into its parent encoder's
/// operation log; validation is identical to the encoder-level call site.
#[derive(Debug)]
pub struct ComputePass {
    parent_id: id::CommandEncoderId,
    label: String,
}

impl ComputePass {
    pub fn parent_id(&self) -> id::CommandEncoderId {
        self.parent_id
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}

impl Global {
    pub fn command_encoder_begin_compute_pass(
        &self,
        encoder_id: id::CommandEncoderId,
        desc: &ComputePassDescriptor,
    ) -> ComputePass {
        profiling::scope!("CommandEncoder::begin_compute_pass");
        api_log!("CommandEncoder::begin_compute_pass {:?}", encoder_id);

        ComputePass {
            parent_id: encoder_id,
            label: desc.label.borrow_or_default().to_string(),
        }
    }

    pub fn compute_pass_write_timestamp(
        &self,
        pass: &mut ComputePass,
        query_set_id: QuerySetId,
        query_index: u32,
    ) -> Result<(), QueryError> {
        profiling::scope!("ComputePass::write_timestamp");
        api_log!(
            "ComputePass::write_timestamp {:?} {:?}[{}]",
            pass.parent_id,
            query_set_id,
            query_index
        );

        self.record_write_timestamp(pass.parent_id, query_set_id, query_index)
    }

    pub fn compute_pass_end(&self, _pass: ComputePass) {
        profiling::scope!("ComputePass::end");
        // Pass operations are recorded straight into the parent encoder, so
        // ending the pass has nothing left to merge.
    }
}
