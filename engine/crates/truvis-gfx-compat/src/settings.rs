use ash::vk;

/// barrier 降级时的配置
#[derive(Copy, Clone, Debug)]
pub struct GfxLegacyBarrierSettings {
    /// 是否把 dependency flags 传给 `vkCmdPipelineBarrier`
    ///
    /// 关闭时 flags 会被丢弃，并输出 debug 日志
    pub honor_dependency_flags: bool,

    /// 提交时 stage mask 为空的处理
    ///
    /// sync1 不允许空的 stage mask：src 为空时使用 TOP_OF_PIPE，dst 为空时使用 BOTTOM_OF_PIPE
    pub fill_empty_stage_masks: bool,

    /// `PRE_RASTERIZATION_SHADERS` 在 sync1 中对应的 stages
    ///
    /// 没有开启 tessellation / geometry feature 的设备需要把对应的 bit 去掉
    pub pre_rasterization_stages: vk::PipelineStageFlags,
}

impl Default for GfxLegacyBarrierSettings {
    fn default() -> Self {
        Self {
            honor_dependency_flags: true,
            fill_empty_stage_masks: true,
            pre_rasterization_stages: vk::PipelineStageFlags::VERTEX_SHADER
                | vk::PipelineStageFlags::TESSELLATION_CONTROL_SHADER
                | vk::PipelineStageFlags::TESSELLATION_EVALUATION_SHADER
                | vk::PipelineStageFlags::GEOMETRY_SHADER,
        }
    }
}

/// 默认 RenderPass 的 attachment 配置
pub struct DefaultRenderPassSettings;
impl DefaultRenderPassSettings {
    pub const SAMPLES: vk::SampleCountFlags = vk::SampleCountFlags::TYPE_1;

    pub const LOAD_OP: vk::AttachmentLoadOp = vk::AttachmentLoadOp::CLEAR;
    pub const STORE_OP: vk::AttachmentStoreOp = vk::AttachmentStoreOp::STORE;
    pub const STENCIL_LOAD_OP: vk::AttachmentLoadOp = vk::AttachmentLoadOp::DONT_CARE;
    pub const STENCIL_STORE_OP: vk::AttachmentStoreOp = vk::AttachmentStoreOp::DONT_CARE;

    pub const INITIAL_LAYOUT: vk::ImageLayout = vk::ImageLayout::UNDEFINED;
    /// 渲染结束后直接用于 present
    pub const FINAL_LAYOUT: vk::ImageLayout = vk::ImageLayout::PRESENT_SRC_KHR;
    /// subpass 内部的 attachment layout
    pub const COLOR_ATTACHMENT_LAYOUT: vk::ImageLayout = vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL;
}
