use crate::{
    api_log,
    command::QueryError,
    global::Global,
    id::{self, QuerySetId},
    Label, LabelHelpers as _,
};

/// Attachments and the rest of the render-pass grammar are handled by
/// collaborators above this crate; the descriptor here only carries what the
/// validation core needs.
#[derive(Clone, Debug, Default)]
pub struct RenderPassDescriptor<'a> {
    pub label: Label<'a>,
}

/// A render-pass recorder, equivalent to [`ComputePass`] for the operations
/// this crate validates.
///
/// [`ComputePass`]: crate::command::ComputePass
#[derive(Debug)]
pub struct RenderPass {
    parent_id: id::CommandEncoderId,
    label: String,
}

impl RenderPass {
    pub fn parent_id(&self) -> id::CommandEncoderId {
        self.parent_id
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}

impl Global {
    pub fn command_encoder_begin_render_pass(
        &self,
        encoder_id: id::CommandEncoderId,
        desc: &RenderPassDescriptor,
    ) -> RenderPass {
        profiling::scope!("CommandEncoder::begin_render_pass");
        api_log!("CommandEncoder::begin_render_pass {:?}", encoder_id);

        RenderPass {
            parent_id: encoder_id,
            label: desc.label.borrow_or_default().to_string(),
        }
    }

    pub fn render_pass_write_timestamp(
        &self,
        pass: &mut RenderPass,
        query_set_id: QuerySetId,
        query_index: u32,
    ) -> Result<(), QueryError> {
        profiling::scope!("RenderPass::write_timestamp");
        api_log!(
            "RenderPass::write_timestamp {:?} {:?}[{}]",
            pass.parent_id,
            query_set_id,
            query_index
        );

        self.record_write_timestamp(pass.parent_id, query_set_id, query_index)
    }

    pub fn render_pass_end(&self, _pass: RenderPass) {
        profiling::scope!("RenderPass::end");
    }
}
