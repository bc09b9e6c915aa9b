//! Truvis GFX 兼容层
//!
//! 渲染前端统一使用 synchronization2 风格的 barrier（每个 barrier 自带 stage mask）。
//! 对于只支持 `vkCmdPipelineBarrier` 的驱动，这里负责把 barrier 降级为旧格式：
//! 整个批次共享一对合并后的 stage mask，单个 barrier 只保留 access / layout / queue family 信息。
//!
//! 另外提供一个最基础的 RenderPass（单 color attachment，单 subpass）。
//!
//! 所有函数都是无状态的，Vulkan 调用统一经过 [`foundation::device::GfxLegacyDevice`]。

pub mod commands;
pub mod foundation;
pub mod pipelines;
pub mod settings;

#[cfg(test)]
pub(crate) mod test_utils;
