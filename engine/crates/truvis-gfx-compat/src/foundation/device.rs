use ash::{prelude::VkResult, vk};

/// 兼容层用到的 device 接口
///
/// 只包含兼容层实际需要的两个调用，`ash::Device` 直接实现该 trait。
/// 方法名与 `ash::Device` 的同名方法区分开，避免被 inherent method 遮蔽。
pub trait GfxLegacyDevice {
    /// 对应 `vkCreateRenderPass`
    fn create_vk_render_pass(&self, render_pass_ci: &vk::RenderPassCreateInfo<'_>) -> VkResult<vk::RenderPass>;

    /// 对应 `vkCmdPipelineBarrier`
    ///
    /// - command type: synchronize
    /// - supported queue types: graphics, compute, transfer
    #[allow(clippy::too_many_arguments)]
    fn cmd_pipeline_barrier1(
        &self,
        command_buffer: vk::CommandBuffer,
        src_stage_mask: vk::PipelineStageFlags,
        dst_stage_mask: vk::PipelineStageFlags,
        dependency_flags: vk::DependencyFlags,
        memory_barriers: &[vk::MemoryBarrier<'_>],
        buffer_barriers: &[vk::BufferMemoryBarrier<'_>],
        image_barriers: &[vk::ImageMemoryBarrier<'_>],
    );
}

impl GfxLegacyDevice for ash::Device {
    #[inline]
    fn create_vk_render_pass(&self, render_pass_ci: &vk::RenderPassCreateInfo<'_>) -> VkResult<vk::RenderPass> {
        unsafe { ash::Device::create_render_pass(self, render_pass_ci, None) }
    }

    #[inline]
    fn cmd_pipeline_barrier1(
        &self,
        command_buffer: vk::CommandBuffer,
        src_stage_mask: vk::PipelineStageFlags,
        dst_stage_mask: vk::PipelineStageFlags,
        dependency_flags: vk::DependencyFlags,
        memory_barriers: &[vk::MemoryBarrier<'_>],
        buffer_barriers: &[vk::BufferMemoryBarrier<'_>],
        image_barriers: &[vk::ImageMemoryBarrier<'_>],
    ) {
        unsafe {
            ash::Device::cmd_pipeline_barrier(
                self,
                command_buffer,
                src_stage_mask,
                dst_stage_mask,
                dependency_flags,
                memory_barriers,
                buffer_barriers,
                image_barriers,
            );
        }
    }
}
