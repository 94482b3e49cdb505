//! Ping-pong ring of particle state targets.
//!
//! Each slot holds one generation of particle state as a set of float
//! textures. Every frame the ring rotates by one: the next slot becomes the
//! write target and the two most recently written slots become read-only
//! inputs. Rotation is index arithmetic; no texel is ever copied.

use super::{STATE_CHANNELS, STATE_FORMAT};

/// Number of state generations kept alive.
pub const RING_SIZE: usize = 3;

const CHANNEL_LABELS: [&str; STATE_CHANNELS] =
    ["particle position", "particle color", "particle data"];

/// Index cursor over a fixed-size ring.
///
/// After `t` advances the current index is `(initial + t) mod len`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RingCursor {
    index: usize,
}

impl RingCursor {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn current(&self) -> usize {
        self.index
    }

    #[inline]
    pub fn previous(&self, len: usize) -> usize {
        (self.index + len - 1) % len
    }

    #[inline]
    pub fn advance(&mut self, len: usize) {
        self.index = (self.index + 1) % len;
    }
}

struct StateSlot {
    views: [wgpu::TextureView; STATE_CHANNELS],
}

fn create_slot(device: &wgpu::Device, grid_size: [u32; 2]) -> StateSlot {
    let views = std::array::from_fn(|channel| {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(CHANNEL_LABELS[channel]),
            size: wgpu::Extent3d {
                width: grid_size[0],
                height: grid_size[1],
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: STATE_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        texture.create_view(&wgpu::TextureViewDescriptor::default())
    });
    StateSlot { views }
}

/// The framebuffer ring plus one pre-built input bind group per rotation.
///
/// `bind_groups[j]` binds slot `j`'s channels at bindings 0..2 and the next
/// older slot's at 3..5, so rotating the ring only changes which group gets
/// bound, never the groups themselves.
pub struct StateRing {
    slots: [StateSlot; RING_SIZE],
    bind_groups: [wgpu::BindGroup; RING_SIZE],
    cursor: RingCursor,
    grid_size: [u32; 2],
}

impl StateRing {
    /// Allocate all slots for the given grid resolution.
    ///
    /// Called lazily, and again whenever the configured resolution changes;
    /// the whole ring is recreated together so the slots stay in sync.
    pub fn new(
        device: &wgpu::Device,
        state_layout: &wgpu::BindGroupLayout,
        grid_size: [u32; 2],
    ) -> Self {
        let slots: [StateSlot; RING_SIZE] = std::array::from_fn(|_| create_slot(device, grid_size));

        let bind_groups = std::array::from_fn(|newest| {
            let older = (newest + RING_SIZE - 1) % RING_SIZE;
            let entries: Vec<wgpu::BindGroupEntry> = (0..STATE_CHANNELS)
                .map(|channel| wgpu::BindGroupEntry {
                    binding: channel as u32,
                    resource: wgpu::BindingResource::TextureView(&slots[newest].views[channel]),
                })
                .chain((0..STATE_CHANNELS).map(|channel| wgpu::BindGroupEntry {
                    binding: (STATE_CHANNELS + channel) as u32,
                    resource: wgpu::BindingResource::TextureView(&slots[older].views[channel]),
                }))
                .collect();

            device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("Particle State Bind Group"),
                layout: state_layout,
                entries: &entries,
            })
        });

        Self {
            slots,
            bind_groups,
            cursor: RingCursor::new(),
            grid_size,
        }
    }

    pub fn grid_size(&self) -> [u32; 2] {
        self.grid_size
    }

    /// Rotate the ring: the next slot becomes this frame's write target.
    pub fn advance(&mut self) {
        self.cursor.advance(RING_SIZE);
    }

    /// Attachment views of the slot being written this frame.
    pub fn write_views(&self) -> &[wgpu::TextureView; STATE_CHANNELS] {
        &self.slots[self.cursor.current()].views
    }

    /// Inputs for the simulation pass: the previous two generations.
    pub fn simulation_inputs(&self) -> &wgpu::BindGroup {
        &self.bind_groups[self.cursor.previous(RING_SIZE)]
    }

    /// Inputs for the shade pass: the state written this frame and the one
    /// before it.
    pub fn shade_inputs(&self) -> &wgpu::BindGroup {
        &self.bind_groups[self.cursor.current()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cursor_rotation_has_period_len() {
        let mut cursor = RingCursor::new();
        for t in 1..=10 {
            cursor.advance(RING_SIZE);
            assert_eq!(cursor.current(), t % RING_SIZE);
        }
    }

    #[test]
    fn test_previous_wraps() {
        let cursor = RingCursor::new();
        assert_eq!(cursor.previous(RING_SIZE), RING_SIZE - 1);

        let mut cursor = RingCursor::new();
        cursor.advance(RING_SIZE);
        assert_eq!(cursor.previous(RING_SIZE), 0);
    }

    #[test]
    fn test_write_and_read_slots_never_alias() {
        let mut cursor = RingCursor::new();
        for _ in 0..RING_SIZE * 2 {
            cursor.advance(RING_SIZE);
            let write = cursor.current();
            let read_newest = cursor.previous(RING_SIZE);
            let read_older = (read_newest + RING_SIZE - 1) % RING_SIZE;
            assert_ne!(write, read_newest);
            assert_ne!(write, read_older);
        }
    }
}
