//! 测试用的 device 替身和日志初始化

use std::cell::RefCell;

use ash::{
    prelude::VkResult,
    vk::{self, Handle},
};

use crate::foundation::device::GfxLegacyDevice;

pub fn init_test_log() {
    let _ = env_logger::Builder::new().is_test(true).filter(None, log::LevelFilter::Trace).try_init();
}

/// 一次 `vkCmdPipelineBarrier` 调用中可以比较的部分
pub struct RecordedBarrierCall {
    pub command_buffer: vk::CommandBuffer,
    pub src_stage_mask: vk::PipelineStageFlags,
    pub dst_stage_mask: vk::PipelineStageFlags,
    pub dependency_flags: vk::DependencyFlags,
    pub memory_barrier_count: usize,
    pub buffers: Vec<vk::Buffer>,
    pub images: Vec<vk::Image>,
}

/// 一次 `vkCreateRenderPass` 调用中读取到的内容
pub struct RecordedRenderPass {
    pub attachment_count: u32,
    pub subpass_count: u32,

    pub format: vk::Format,
    pub samples: vk::SampleCountFlags,
    pub load_op: vk::AttachmentLoadOp,
    pub store_op: vk::AttachmentStoreOp,
    pub initial_layout: vk::ImageLayout,
    pub final_layout: vk::ImageLayout,

    pub bind_point: vk::PipelineBindPoint,
    pub color_attachment_count: u32,
    pub color_ref_attachment: u32,
    pub color_ref_layout: vk::ImageLayout,
}

#[derive(Default)]
pub struct FakeDevice {
    pub render_pass_result: Option<vk::Result>,
    pub render_pass_calls: RefCell<Vec<RecordedRenderPass>>,
    pub barrier_calls: RefCell<Vec<RecordedBarrierCall>>,
}

impl FakeDevice {
    pub fn render_pass_handle() -> vk::RenderPass {
        vk::RenderPass::from_raw(0x5150)
    }

    pub fn failing(result: vk::Result) -> Self {
        Self {
            render_pass_result: Some(result),
            ..Default::default()
        }
    }
}

impl GfxLegacyDevice for FakeDevice {
    fn create_vk_render_pass(&self, render_pass_ci: &vk::RenderPassCreateInfo<'_>) -> VkResult<vk::RenderPass> {
        if let Some(result) = self.render_pass_result {
            return Err(result);
        }

        // create info 中的指针在调用期间有效
        let attachment = unsafe { &*render_pass_ci.p_attachments };
        let subpass = unsafe { &*render_pass_ci.p_subpasses };
        let color_ref = unsafe { &*subpass.p_color_attachments };

        self.render_pass_calls.borrow_mut().push(RecordedRenderPass {
            attachment_count: render_pass_ci.attachment_count,
            subpass_count: render_pass_ci.subpass_count,
            format: attachment.format,
            samples: attachment.samples,
            load_op: attachment.load_op,
            store_op: attachment.store_op,
            initial_layout: attachment.initial_layout,
            final_layout: attachment.final_layout,
            bind_point: subpass.pipeline_bind_point,
            color_attachment_count: subpass.color_attachment_count,
            color_ref_attachment: color_ref.attachment,
            color_ref_layout: color_ref.layout,
        });

        Ok(Self::render_pass_handle())
    }

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
        self.barrier_calls.borrow_mut().push(RecordedBarrierCall {
            command_buffer,
            src_stage_mask,
            dst_stage_mask,
            dependency_flags,
            memory_barrier_count: memory_barriers.len(),
            buffers: buffer_barriers.iter().map(|barrier| barrier.buffer).collect(),
            images: image_barriers.iter().map(|barrier| barrier.image).collect(),
        });
    }
}
