//! synchronization2 barrier 降级
//!
//! sync2 的每个 barrier 都带有自己的 src / dst stage mask，而 `vkCmdPipelineBarrier`
//! 只接受一对作用于整个批次的 stage mask。降级时：
//!
//! - 所有 barrier 的 stage mask 按位或到同一对累加器中（buffer、image、memory 共享）
//! - 每个 barrier 一对一地转换为旧格式，顺序不变，除 stage mask 外的字段原样复制
//!
//! sync2 独有的 stage / access bit（高 32 位）会折叠到 sync1 中覆盖它的 bit 上。
//! 没有对应 bit 的 stage 折叠为 ALL_COMMANDS，没有对应 bit 的 access 被丢弃，两者都会输出 warning。

use ash::vk;
use itertools::Itertools;

use crate::{foundation::device::GfxLegacyDevice, settings::GfxLegacyBarrierSettings};

/// sync1 能表示的 bit 都在低 32 位
const SYNC1_BITS: u64 = 0xFFFF_FFFF;

const SYNC2_TRANSFER_STAGES: vk::PipelineStageFlags2 = vk::PipelineStageFlags2::from_raw(
    vk::PipelineStageFlags2::COPY.as_raw()
        | vk::PipelineStageFlags2::RESOLVE.as_raw()
        | vk::PipelineStageFlags2::BLIT.as_raw()
        | vk::PipelineStageFlags2::CLEAR.as_raw(),
);
const SYNC2_VERTEX_INPUT_STAGES: vk::PipelineStageFlags2 = vk::PipelineStageFlags2::from_raw(
    vk::PipelineStageFlags2::INDEX_INPUT.as_raw() | vk::PipelineStageFlags2::VERTEX_ATTRIBUTE_INPUT.as_raw(),
);
const SYNC2_SHADER_READ_ACCESS: vk::AccessFlags2 = vk::AccessFlags2::from_raw(
    vk::AccessFlags2::SHADER_SAMPLED_READ.as_raw() | vk::AccessFlags2::SHADER_STORAGE_READ.as_raw(),
);

/// 将 sync2 的 stage mask 转换为 sync1 的 stage mask
///
/// 低 32 位原样保留，没有对应 bit 的 stage 折叠为 ALL_COMMANDS
pub fn legacy_stage_flags(
    settings: &GfxLegacyBarrierSettings,
    stages: vk::PipelineStageFlags2,
) -> vk::PipelineStageFlags {
    let raw = stages.as_raw();
    let mut legacy = vk::PipelineStageFlags::from_raw((raw & SYNC1_BITS) as u32);

    let sync2_only = raw & !SYNC1_BITS;
    if sync2_only == 0 {
        return legacy;
    }

    let mut handled = 0;
    if sync2_only & SYNC2_TRANSFER_STAGES.as_raw() != 0 {
        legacy |= vk::PipelineStageFlags::TRANSFER;
        handled |= SYNC2_TRANSFER_STAGES.as_raw();
    }
    if sync2_only & SYNC2_VERTEX_INPUT_STAGES.as_raw() != 0 {
        legacy |= vk::PipelineStageFlags::VERTEX_INPUT;
        handled |= SYNC2_VERTEX_INPUT_STAGES.as_raw();
    }
    if sync2_only & vk::PipelineStageFlags2::PRE_RASTERIZATION_SHADERS.as_raw() != 0 {
        legacy |= settings.pre_rasterization_stages;
        handled |= vk::PipelineStageFlags2::PRE_RASTERIZATION_SHADERS.as_raw();
    }

    let unknown = sync2_only & !handled;
    if unknown != 0 {
        log::warn!(
            "pipeline stages {:?} have no vkCmdPipelineBarrier equivalent, use ALL_COMMANDS",
            vk::PipelineStageFlags2::from_raw(unknown)
        );
        legacy |= vk::PipelineStageFlags::ALL_COMMANDS;
    }

    legacy
}

/// 将 sync2 的 access mask 转换为 sync1 的 access mask
///
/// 低 32 位原样保留
pub fn legacy_access_flags(access: vk::AccessFlags2) -> vk::AccessFlags {
    let raw = access.as_raw();
    let mut legacy = vk::AccessFlags::from_raw((raw & SYNC1_BITS) as u32);

    let sync2_only = raw & !SYNC1_BITS;
    if sync2_only == 0 {
        return legacy;
    }

    let mut handled = 0;
    if sync2_only & SYNC2_SHADER_READ_ACCESS.as_raw() != 0 {
        legacy |= vk::AccessFlags::SHADER_READ;
        handled |= SYNC2_SHADER_READ_ACCESS.as_raw();
    }
    if sync2_only & vk::AccessFlags2::SHADER_STORAGE_WRITE.as_raw() != 0 {
        legacy |= vk::AccessFlags::SHADER_WRITE;
        handled |= vk::AccessFlags2::SHADER_STORAGE_WRITE.as_raw();
    }

    let dropped = sync2_only & !handled;
    if dropped != 0 {
        log::warn!(
            "access flags {:?} have no vkCmdPipelineBarrier equivalent, dropped",
            vk::AccessFlags2::from_raw(dropped)
        );
    }

    legacy
}

/// 整个 barrier 批次共享的 stage mask 累加器
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct GfxStageMaskPair {
    pub src: vk::PipelineStageFlags,
    pub dst: vk::PipelineStageFlags,
}

impl GfxStageMaskPair {
    pub fn new() -> Self {
        Self::default()
    }

    /// 将一个 sync2 barrier 的 stage mask 并入累加器
    #[inline]
    pub fn accumulate(
        &mut self,
        settings: &GfxLegacyBarrierSettings,
        src_stage_mask: vk::PipelineStageFlags2,
        dst_stage_mask: vk::PipelineStageFlags2,
    ) {
        self.src |= legacy_stage_flags(settings, src_stage_mask);
        self.dst |= legacy_stage_flags(settings, dst_stage_mask);
    }
}

/// 降级后的 barrier 批次，可以直接交给 `vkCmdPipelineBarrier`
pub struct GfxLegacyBarrierBatch<'a> {
    /// 所有 barrier 的 src stage 的并集
    pub src_stage_mask: vk::PipelineStageFlags,
    /// 所有 barrier 的 dst stage 的并集
    pub dst_stage_mask: vk::PipelineStageFlags,
    pub dependency_flags: vk::DependencyFlags,

    pub memory_barriers: Vec<vk::MemoryBarrier<'a>>,
    pub buffer_barriers: Vec<vk::BufferMemoryBarrier<'a>>,
    pub image_barriers: Vec<vk::ImageMemoryBarrier<'a>>,
}

impl GfxLegacyBarrierBatch<'_> {
    #[inline]
    pub fn barrier_count(&self) -> usize {
        self.memory_barriers.len() + self.buffer_barriers.len() + self.image_barriers.len()
    }

    /// 实际提交时使用的 stage mask
    ///
    /// 所有 barrier 的 stage 都为 NONE 时合并结果为空，例如从 UNDEFINED layout 转换的 image barrier
    pub fn stage_masks_for_submit(
        &self,
        settings: &GfxLegacyBarrierSettings,
    ) -> (vk::PipelineStageFlags, vk::PipelineStageFlags) {
        let mut src_stage_mask = self.src_stage_mask;
        let mut dst_stage_mask = self.dst_stage_mask;

        if settings.fill_empty_stage_masks {
            if src_stage_mask.is_empty() {
                src_stage_mask = vk::PipelineStageFlags::TOP_OF_PIPE;
            }
            if dst_stage_mask.is_empty() {
                dst_stage_mask = vk::PipelineStageFlags::BOTTOM_OF_PIPE;
            }
        }

        (src_stage_mask, dst_stage_mask)
    }
}

pub fn downgrade_buffer_barriers<'a>(
    settings: &GfxLegacyBarrierSettings,
    buffer_barriers: &[vk::BufferMemoryBarrier2<'a>],
    stage_masks: &mut GfxStageMaskPair,
) -> Vec<vk::BufferMemoryBarrier<'a>> {
    buffer_barriers
        .iter()
        .map(|barrier2| {
            stage_masks.accumulate(settings, barrier2.src_stage_mask, barrier2.dst_stage_mask);

            let mut barrier1 = vk::BufferMemoryBarrier::default()
                .src_access_mask(legacy_access_flags(barrier2.src_access_mask))
                .dst_access_mask(legacy_access_flags(barrier2.dst_access_mask))
                .src_queue_family_index(barrier2.src_queue_family_index)
                .dst_queue_family_index(barrier2.dst_queue_family_index)
                .buffer(barrier2.buffer)
                .offset(barrier2.offset)
                .size(barrier2.size);
            barrier1.p_next = barrier2.p_next;
            barrier1
        })
        .collect_vec()
}

pub fn downgrade_image_barriers<'a>(
    settings: &GfxLegacyBarrierSettings,
    image_barriers: &[vk::ImageMemoryBarrier2<'a>],
    stage_masks: &mut GfxStageMaskPair,
) -> Vec<vk::ImageMemoryBarrier<'a>> {
    image_barriers
        .iter()
        .map(|barrier2| {
            stage_masks.accumulate(settings, barrier2.src_stage_mask, barrier2.dst_stage_mask);

            let mut barrier1 = vk::ImageMemoryBarrier::default()
                .src_access_mask(legacy_access_flags(barrier2.src_access_mask))
                .dst_access_mask(legacy_access_flags(barrier2.dst_access_mask))
                .old_layout(barrier2.old_layout)
                .new_layout(barrier2.new_layout)
                .src_queue_family_index(barrier2.src_queue_family_index)
                .dst_queue_family_index(barrier2.dst_queue_family_index)
                .image(barrier2.image)
                .subresource_range(barrier2.subresource_range);
            barrier1.p_next = barrier2.p_next;
            barrier1
        })
        .collect_vec()
}

pub fn downgrade_memory_barriers<'a>(
    settings: &GfxLegacyBarrierSettings,
    memory_barriers: &[vk::MemoryBarrier2<'a>],
    stage_masks: &mut GfxStageMaskPair,
) -> Vec<vk::MemoryBarrier<'a>> {
    memory_barriers
        .iter()
        .map(|barrier2| {
            stage_masks.accumulate(settings, barrier2.src_stage_mask, barrier2.dst_stage_mask);

            let mut barrier1 = vk::MemoryBarrier::default()
                .src_access_mask(legacy_access_flags(barrier2.src_access_mask))
                .dst_access_mask(legacy_access_flags(barrier2.dst_access_mask));
            barrier1.p_next = barrier2.p_next;
            barrier1
        })
        .collect_vec()
}

/// 将 buffer 和 image barrier 降级为一个批次，使用默认配置
///
/// # Panics
/// 两个列表都为空时 panic：调用者不应该提交一个什么都不同步的 barrier
pub fn downgrade_barriers<'a>(
    buffer_barriers: &[vk::BufferMemoryBarrier2<'a>],
    image_barriers: &[vk::ImageMemoryBarrier2<'a>],
) -> GfxLegacyBarrierBatch<'a> {
    downgrade_barriers_with(
        &GfxLegacyBarrierSettings::default(),
        &[],
        buffer_barriers,
        image_barriers,
        vk::DependencyFlags::empty(),
    )
}

/// 完整形式的降级，额外支持 global memory barrier 和 dependency flags
///
/// # Panics
/// 三个列表都为空时 panic
pub fn downgrade_barriers_with<'a>(
    settings: &GfxLegacyBarrierSettings,
    memory_barriers: &[vk::MemoryBarrier2<'a>],
    buffer_barriers: &[vk::BufferMemoryBarrier2<'a>],
    image_barriers: &[vk::ImageMemoryBarrier2<'a>],
    dependency_flags: vk::DependencyFlags,
) -> GfxLegacyBarrierBatch<'a> {
    assert!(
        memory_barriers.len() + buffer_barriers.len() + image_barriers.len() > 0,
        "pipeline barrier without any barrier"
    );

    let mut stage_masks = GfxStageMaskPair::new();
    let memory_barriers = downgrade_memory_barriers(settings, memory_barriers, &mut stage_masks);
    let buffer_barriers = downgrade_buffer_barriers(settings, buffer_barriers, &mut stage_masks);
    let image_barriers = downgrade_image_barriers(settings, image_barriers, &mut stage_masks);

    let dependency_flags = if settings.honor_dependency_flags {
        dependency_flags
    } else {
        if !dependency_flags.is_empty() {
            log::debug!("dependency flags {:?} dropped for legacy pipeline barrier", dependency_flags);
        }
        vk::DependencyFlags::empty()
    };

    log::trace!(
        "downgrade barriers: memory={}, buffer={}, image={}, src={:?}, dst={:?}",
        memory_barriers.len(),
        buffer_barriers.len(),
        image_barriers.len(),
        stage_masks.src,
        stage_masks.dst
    );

    GfxLegacyBarrierBatch {
        src_stage_mask: stage_masks.src,
        dst_stage_mask: stage_masks.dst,
        dependency_flags,
        memory_barriers,
        buffer_barriers,
        image_barriers,
    }
}

/// 使用 `vkCmdPipelineBarrier` 录制 sync2 形式的 barrier
///
/// - command type: synchronize
/// - supported queue types: graphics, compute, transfer
///
/// # Panics
/// buffer 和 image barrier 都为空时 panic
pub fn cmd_pipeline_barrier1<D: GfxLegacyDevice + ?Sized>(
    device: &D,
    command_buffer: vk::CommandBuffer,
    settings: &GfxLegacyBarrierSettings,
    buffer_barriers: &[vk::BufferMemoryBarrier2<'_>],
    image_barriers: &[vk::ImageMemoryBarrier2<'_>],
    dependency_flags: vk::DependencyFlags,
) {
    let batch = downgrade_barriers_with(settings, &[], buffer_barriers, image_barriers, dependency_flags);
    cmd_record_batch(device, command_buffer, settings, &batch);
}

/// 录制一个已经降级好的批次
pub fn cmd_record_batch<D: GfxLegacyDevice + ?Sized>(
    device: &D,
    command_buffer: vk::CommandBuffer,
    settings: &GfxLegacyBarrierSettings,
    batch: &GfxLegacyBarrierBatch<'_>,
) {
    let (src_stage_mask, dst_stage_mask) = batch.stage_masks_for_submit(settings);
    device.cmd_pipeline_barrier1(
        command_buffer,
        src_stage_mask,
        dst_stage_mask,
        batch.dependency_flags,
        &batch.memory_barriers,
        &batch.buffer_barriers,
        &batch.image_barriers,
    );
}
