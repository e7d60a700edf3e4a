use crate::records::UiElementFrame;
use crate::types::Vec2;
use atlas_memory::RemoteReader;

/// Design-space resolution the foreign binary authors its UI against.
pub const BASE_RESOLUTION: Vec2 = Vec2 {
    x: 2560.0,
    y: 1600.0,
};

/// Parent-chain iteration cap. Corrupt data can make chains cyclic or
/// arbitrarily deep; past this many hops the walk stops where it is.
pub const MAX_PARENT_HOPS: u32 = 64;

/// Floor for the per-element scale multiplier, so downstream division by a
/// resolved scale can never hit zero.
pub const MIN_SCALE: f32 = 0.0001;

/// Composes chains of parent-relative position/scale records into absolute
/// screen positions for the current display size.
#[derive(Debug, Clone, Copy)]
pub struct TransformResolver {
    /// Current display size in pixels.
    display: Vec2,
    /// Configured reference display size, used only for `relative_ui_scale`.
    reference: Vec2,
}

impl TransformResolver {
    pub fn new(display: Vec2, reference: Vec2) -> Self {
        Self { display, reference }
    }

    pub fn display(&self) -> Vec2 {
        self.display
    }

    /// Per-axis scale for one element at the current display size. The
    /// scale index selects which display/base ratio applies; malformed
    /// values fall back to independent axes.
    pub fn scale_pair(&self, frame: &UiElementFrame) -> Vec2 {
        let sx = self.display.x / BASE_RESOLUTION.x.max(1.0);
        let sy = self.display.y / BASE_RESOLUTION.y.max(1.0);
        let pair = match frame.scale_index {
            0 => Vec2::new(sx, sx),
            1 => Vec2::new(sy, sy),
            2 => {
                let s = sx.min(sy);
                Vec2::new(s, s)
            }
            _ => Vec2::new(sx, sy),
        };
        let multiplier = { frame.local_scale }.max(MIN_SCALE);
        Vec2::new(pair.x * multiplier, pair.y * multiplier)
    }

    /// Uniform scale of one element at an arbitrary display size.
    pub fn uniform_scale(&self, frame: &UiElementFrame, width: f32, height: f32) -> f32 {
        let sx = width / BASE_RESOLUTION.x.max(1.0);
        let sy = height / BASE_RESOLUTION.y.max(1.0);
        let s = match frame.scale_index {
            0 => sx,
            1 => sy,
            _ => sx.min(sy),
        };
        s * { frame.local_scale }.max(MIN_SCALE)
    }

    /// Current-display scale over reference-display scale. Pure font/label
    /// sizing input, deliberately decoupled from position math.
    pub fn relative_ui_scale(&self, frame: &UiElementFrame) -> f32 {
        let current = self.uniform_scale(frame, self.display.x, self.display.y);
        let preferred = self.uniform_scale(frame, self.reference.x, self.reference.y);
        if preferred > 0.0 {
            current / preferred
        } else {
            1.0
        }
    }

    /// Absolute top-left of a leaf element, in current display pixels.
    ///
    /// Walks leaf→root accumulating `relative_pos * scale` (plus the
    /// position modifier where flagged). The walk stops on a null parent,
    /// on a parent pointing back at the previously visited element, or
    /// after [`MAX_PARENT_HOPS`] hops; foreign chains are never trusted to
    /// be acyclic.
    pub fn absolute_top_left(&self, reader: &RemoteReader, leaf: &UiElementFrame) -> Vec2 {
        let mut pos = Vec2::default();
        let mut current = *leaf;
        let mut previous_addr = 0u64;
        let mut hops = 0u32;
        loop {
            let scale = self.scale_pair(&current);
            let rel = current.relative_pos;
            pos.x += rel.x * scale.x;
            pos.y += rel.y * scale.y;
            if current.wants_position_modifier() {
                let modifier = current.position_modifier;
                pos.x += modifier.x * scale.x;
                pos.y += modifier.y * scale.y;
            }

            let parent = current.parent;
            if parent == 0 || parent == previous_addr {
                break;
            }
            hops += 1;
            if hops > MAX_PARENT_HOPS {
                break;
            }
            previous_addr = current.self_addr;
            current = reader.read(parent);
        }
        pos
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use atlas_memory::{bytes_of, FromMemory, ImageSource};

    fn resolver() -> TransformResolver {
        // Same size as the base resolution: axis ratios are 1.0.
        TransformResolver::new(BASE_RESOLUTION, BASE_RESOLUTION)
    }

    fn frame(scale_index: u8, local_scale: f32) -> UiElementFrame {
        let mut f = UiElementFrame::zeroed();
        f.scale_index = scale_index;
        f.local_scale = local_scale;
        f
    }

    #[test]
    fn scale_pair_selects_axis_by_index() {
        let r = TransformResolver::new(Vec2::new(1280.0, 1600.0), BASE_RESOLUTION);
        // sx = 0.5, sy = 1.0
        assert_eq!(r.scale_pair(&frame(0, 1.0)), Vec2::new(0.5, 0.5));
        assert_eq!(r.scale_pair(&frame(1, 1.0)), Vec2::new(1.0, 1.0));
        assert_eq!(r.scale_pair(&frame(2, 1.0)), Vec2::new(0.5, 0.5));
        // Malformed index: independent axes.
        assert_eq!(r.scale_pair(&frame(9, 1.0)), Vec2::new(0.5, 1.0));
    }

    #[test]
    fn scale_multiplier_is_floored() {
        let r = resolver();
        let pair = r.scale_pair(&frame(0, 0.0));
        assert!(pair.x >= MIN_SCALE && pair.y >= MIN_SCALE);
        let pair = r.scale_pair(&frame(0, -3.0));
        assert!(pair.x >= MIN_SCALE);
    }

    #[test]
    fn relative_ui_scale_is_current_over_reference() {
        let r = TransformResolver::new(Vec2::new(1280.0, 800.0), BASE_RESOLUTION);
        let f = frame(2, 1.0);
        let rel = r.relative_ui_scale(&f);
        assert!((rel - 0.5).abs() < 1e-6);
    }

    #[test]
    fn top_left_accumulates_parent_chain() {
        let mut parent = frame(9, 1.0);
        parent.self_addr = 0x2000;
        parent.relative_pos = crate::records::PackedVec2 { x: 100.0, y: 50.0 };

        let mut leaf = frame(9, 1.0);
        leaf.self_addr = 0x3000;
        leaf.parent = 0x2000;
        leaf.relative_pos = crate::records::PackedVec2 { x: 10.0, y: 20.0 };

        let mut image = ImageSource::new(0x2000, Vec::new());
        image.write(0x2000, &bytes_of(&parent));
        let reader = RemoteReader::from_image(image);

        let pos = resolver().absolute_top_left(&reader, &leaf);
        assert_eq!(pos, Vec2::new(110.0, 70.0));
    }

    #[test]
    fn top_left_applies_position_modifier_when_flagged() {
        let mut leaf = frame(9, 1.0);
        leaf.relative_pos = crate::records::PackedVec2 { x: 10.0, y: 10.0 };
        leaf.position_modifier = crate::records::PackedVec2 { x: 5.0, y: -5.0 };
        let reader = RemoteReader::new();

        let without = resolver().absolute_top_left(&reader, &leaf);
        leaf.flags |= crate::records::FLAG_POSITION_MODIFIER;
        let with = resolver().absolute_top_left(&reader, &leaf);
        assert_eq!(without, Vec2::new(10.0, 10.0));
        assert_eq!(with, Vec2::new(15.0, 5.0));
    }

    #[test]
    fn top_left_terminates_on_self_referential_parent() {
        let mut looped = frame(9, 1.0);
        looped.self_addr = 0x2000;
        looped.parent = 0x2000;
        looped.relative_pos = crate::records::PackedVec2 { x: 1.0, y: 0.0 };

        let mut image = ImageSource::new(0x2000, Vec::new());
        image.write(0x2000, &bytes_of(&looped));
        let reader = RemoteReader::from_image(image);

        // Visits the element twice (once as leaf, once through the parent
        // pointer), then detects the loop.
        let pos = resolver().absolute_top_left(&reader, &looped);
        assert_eq!(pos, Vec2::new(2.0, 0.0));
    }

    #[test]
    fn top_left_terminates_on_parent_pointing_back() {
        // Two elements pointing at each other: caught by the
        // previous-address check after one hop.
        let mut a = frame(9, 1.0);
        a.self_addr = 0x2000;
        a.parent = 0x3000;
        a.relative_pos = crate::records::PackedVec2 { x: 1.0, y: 0.0 };
        let mut b = frame(9, 1.0);
        b.self_addr = 0x3000;
        b.parent = 0x2000;
        b.relative_pos = crate::records::PackedVec2 { x: 1.0, y: 0.0 };

        let mut image = ImageSource::new(0x2000, Vec::new());
        image.write(0x2000, &bytes_of(&a));
        image.write(0x3000, &bytes_of(&b));
        let reader = RemoteReader::from_image(image);

        let pos = resolver().absolute_top_left(&reader, &a);
        assert_eq!(pos.x, 2.0);
    }

    #[test]
    fn top_left_terminates_on_hop_cap() {
        // Three-element ring: too long a period for the previous-address
        // check, so only the hop cap stops the walk.
        let addrs = [0x2000u64, 0x3000, 0x4000];
        let mut image = ImageSource::new(0x2000, Vec::new());
        for (i, &addr) in addrs.iter().enumerate() {
            let mut f = frame(9, 1.0);
            f.self_addr = addr;
            f.parent = addrs[(i + 1) % addrs.len()];
            f.relative_pos = crate::records::PackedVec2 { x: 1.0, y: 0.0 };
            image.write(addr, &bytes_of(&f));
        }
        let reader = RemoteReader::from_image(image.clone());

        let leaf: UiElementFrame = reader.read(0x2000);
        let pos = resolver().absolute_top_left(&reader, &leaf);
        // Leaf plus MAX_PARENT_HOPS parents, one unit each.
        assert_eq!(pos.x, (MAX_PARENT_HOPS + 1) as f32);
    }
}
