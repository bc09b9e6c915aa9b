use ash::vk;
use thiserror::Error;

use crate::{foundation::device::GfxLegacyDevice, settings::DefaultRenderPassSettings};

#[derive(Debug, Error)]
pub enum GfxRenderPassError {
    #[error("Couldn't create default render pass: {0}")]
    CreationFailed(#[source] vk::Result),
}

/// 默认 RenderPass 唯一的 color attachment
///
/// 参数来自 [`DefaultRenderPassSettings`]
pub fn default_render_pass_attachment(color_format: vk::Format) -> vk::AttachmentDescription {
    vk::AttachmentDescription::default()
        .format(color_format)
        .samples(DefaultRenderPassSettings::SAMPLES)
        .load_op(DefaultRenderPassSettings::LOAD_OP)
        .store_op(DefaultRenderPassSettings::STORE_OP)
        .stencil_load_op(DefaultRenderPassSettings::STENCIL_LOAD_OP)
        .stencil_store_op(DefaultRenderPassSettings::STENCIL_STORE_OP)
        .initial_layout(DefaultRenderPassSettings::INITIAL_LAYOUT)
        .final_layout(DefaultRenderPassSettings::FINAL_LAYOUT)
}

/// 创建最基础的 RenderPass：一个 color attachment，一个 graphics subpass
///
/// 创建失败时不会产生任何 handle，由调用者决定是否重试
pub fn create_default_render_pass<D: GfxLegacyDevice + ?Sized>(
    device: &D,
    color_format: vk::Format,
) -> Result<vk::RenderPass, GfxRenderPassError> {
    let attachments = [default_render_pass_attachment(color_format)];
    let color_attachment_refs = [vk::AttachmentReference::default()
        .attachment(0)
        .layout(DefaultRenderPassSettings::COLOR_ATTACHMENT_LAYOUT)];
    let subpasses = [vk::SubpassDescription::default()
        .pipeline_bind_point(vk::PipelineBindPoint::GRAPHICS)
        .color_attachments(&color_attachment_refs)];

    let render_pass_ci = vk::RenderPassCreateInfo::default().attachments(&attachments).subpasses(&subpasses);

    let render_pass = device.create_vk_render_pass(&render_pass_ci).map_err(|result| {
        log::error!("failed to create default render pass ({:?}): {:?}", color_format, result);
        GfxRenderPassError::CreationFailed(result)
    })?;

    log::debug!("default render pass created, color format: {:?}", color_format);
    Ok(render_pass)
}
