use std::ffi::c_void;

use ash::vk;

/// 一个 sync2 barrier 两端的 stage 和 access
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct GfxBarrierMask {
    pub src_stage: vk::PipelineStageFlags2,
    pub dst_stage: vk::PipelineStageFlags2,
    pub src_access: vk::AccessFlags2,
    pub dst_access: vk::AccessFlags2,
}

impl GfxBarrierMask {
    #[inline]
    pub const fn new(
        src_stage: vk::PipelineStageFlags2,
        src_access: vk::AccessFlags2,
        dst_stage: vk::PipelineStageFlags2,
        dst_access: vk::AccessFlags2,
    ) -> Self {
        Self {
            src_stage,
            dst_stage,
            src_access,
            dst_access,
        }
    }

    /// transfer 写入之后，在 fragment shader 中读取
    pub const TRANSFER_WRITE_TO_FRAGMENT_READ: Self = Self::new(
        vk::PipelineStageFlags2::TRANSFER,
        vk::AccessFlags2::TRANSFER_WRITE,
        vk::PipelineStageFlags2::FRAGMENT_SHADER,
        vk::AccessFlags2::SHADER_READ,
    );

    /// compute shader 写入之后，在 compute shader 中读取
    pub const COMPUTE_WRITE_TO_COMPUTE_READ: Self = Self::new(
        vk::PipelineStageFlags2::COMPUTE_SHADER,
        vk::AccessFlags2::SHADER_WRITE,
        vk::PipelineStageFlags2::COMPUTE_SHADER,
        vk::AccessFlags2::SHADER_READ,
    );
}

/// 便捷创建 sync2 image memory barrier
///
/// 默认值：不做 queue family 转移，覆盖第 0 层 mip 和第 0 层 array layer
#[derive(Copy, Clone)]
pub struct GfxImageBarrier {
    inner: vk::ImageMemoryBarrier2<'static>,
}

impl Default for GfxImageBarrier {
    fn default() -> Self {
        Self {
            inner: vk::ImageMemoryBarrier2 {
                old_layout: vk::ImageLayout::UNDEFINED,
                new_layout: vk::ImageLayout::UNDEFINED,
                src_queue_family_index: vk::QUEUE_FAMILY_IGNORED,
                dst_queue_family_index: vk::QUEUE_FAMILY_IGNORED,
                subresource_range: vk::ImageSubresourceRange {
                    aspect_mask: vk::ImageAspectFlags::empty(),
                    base_mip_level: 0,
                    level_count: 1,
                    base_array_layer: 0,
                    layer_count: 1,
                },
                ..Default::default()
            },
        }
    }
}

// new & getter
impl GfxImageBarrier {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn inner(&self) -> &vk::ImageMemoryBarrier2<'static> {
        &self.inner
    }
}

// builder
impl GfxImageBarrier {
    #[inline]
    pub fn image(mut self, image: vk::Image) -> Self {
        self.inner.image = image;
        self
    }

    #[inline]
    pub fn layout_transfer(mut self, old_layout: vk::ImageLayout, new_layout: vk::ImageLayout) -> Self {
        self.inner.old_layout = old_layout;
        self.inner.new_layout = new_layout;
        self
    }

    #[inline]
    pub fn queue_family_transfer(mut self, src_queue_family_index: u32, dst_queue_family_index: u32) -> Self {
        self.inner.src_queue_family_index = src_queue_family_index;
        self.inner.dst_queue_family_index = dst_queue_family_index;
        self
    }

    #[inline]
    pub fn src_mask(mut self, src_stage_mask: vk::PipelineStageFlags2, src_access_mask: vk::AccessFlags2) -> Self {
        self.inner.src_stage_mask = src_stage_mask;
        self.inner.src_access_mask = src_access_mask;
        self
    }

    #[inline]
    pub fn dst_mask(mut self, dst_stage_mask: vk::PipelineStageFlags2, dst_access_mask: vk::AccessFlags2) -> Self {
        self.inner.dst_stage_mask = dst_stage_mask;
        self.inner.dst_access_mask = dst_access_mask;
        self
    }

    #[inline]
    pub fn mask(self, mask: GfxBarrierMask) -> Self {
        self.src_mask(mask.src_stage, mask.src_access).dst_mask(mask.dst_stage, mask.dst_access)
    }

    /// layer 和 mip level 保持默认值
    #[inline]
    pub fn image_aspect_flag(mut self, aspect_mask: vk::ImageAspectFlags) -> Self {
        self.inner.subresource_range.aspect_mask = aspect_mask;
        self
    }

    #[inline]
    pub fn subresource_range(mut self, subresource_range: vk::ImageSubresourceRange) -> Self {
        self.inner.subresource_range = subresource_range;
        self
    }

    /// 设置 `p_next` 扩展链
    ///
    /// 指针只会被原样复制到降级后的 barrier 中，调用者需要保证它在录制期间有效
    #[inline]
    pub fn extension_chain(mut self, p_next: *const c_void) -> Self {
        self.inner.p_next = p_next;
        self
    }
}

/// 便捷创建 sync2 buffer memory barrier
///
/// 默认覆盖整个 buffer，不做 queue family 转移
#[derive(Copy, Clone)]
pub struct GfxBufferBarrier {
    inner: vk::BufferMemoryBarrier2<'static>,
}

impl Default for GfxBufferBarrier {
    fn default() -> Self {
        Self {
            inner: vk::BufferMemoryBarrier2 {
                src_queue_family_index: vk::QUEUE_FAMILY_IGNORED,
                dst_queue_family_index: vk::QUEUE_FAMILY_IGNORED,
                offset: 0,
                size: vk::WHOLE_SIZE,
                ..Default::default()
            },
        }
    }
}

// new & getter
impl GfxBufferBarrier {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn inner(&self) -> &vk::BufferMemoryBarrier2<'static> {
        &self.inner
    }
}

// builder
impl GfxBufferBarrier {
    #[inline]
    pub fn buffer(mut self, buffer: vk::Buffer, offset: vk::DeviceSize, size: vk::DeviceSize) -> Self {
        self.inner.buffer = buffer;
        self.inner.offset = offset;
        self.inner.size = size;
        self
    }

    #[inline]
    pub fn whole_buffer(self, buffer: vk::Buffer) -> Self {
        self.buffer(buffer, 0, vk::WHOLE_SIZE)
    }

    #[inline]
    pub fn queue_family_transfer(mut self, src_queue_family_index: u32, dst_queue_family_index: u32) -> Self {
        self.inner.src_queue_family_index = src_queue_family_index;
        self.inner.dst_queue_family_index = dst_queue_family_index;
        self
    }

    #[inline]
    pub fn src_mask(mut self, src_stage_mask: vk::PipelineStageFlags2, src_access_mask: vk::AccessFlags2) -> Self {
        self.inner.src_stage_mask = src_stage_mask;
        self.inner.src_access_mask = src_access_mask;
        self
    }

    #[inline]
    pub fn dst_mask(mut self, dst_stage_mask: vk::PipelineStageFlags2, dst_access_mask: vk::AccessFlags2) -> Self {
        self.inner.dst_stage_mask = dst_stage_mask;
        self.inner.dst_access_mask = dst_access_mask;
        self
    }

    #[inline]
    pub fn mask(self, mask: GfxBarrierMask) -> Self {
        self.src_mask(mask.src_stage, mask.src_access).dst_mask(mask.dst_stage, mask.dst_access)
    }

    /// 参见 [`GfxImageBarrier::extension_chain`]
    #[inline]
    pub fn extension_chain(mut self, p_next: *const c_void) -> Self {
        self.inner.p_next = p_next;
        self
    }
}
