use atlas_graph::records::UiElementFrame;
use atlas_memory::RemoteReader;

/// Child-index walk from the foreign UI root down to the atlas panel.
///
/// The index chains differ between input modes and shift between external
/// binary revisions, so they are data, not code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelPath {
    slots: Vec<usize>,
}

impl PanelPath {
    /// Keyboard/mouse UI layout.
    pub fn keyboard() -> Self {
        Self {
            slots: vec![25, 0, 6],
        }
    }

    /// Controller UI layout.
    pub fn controller() -> Self {
        Self {
            slots: vec![17, 2, 3, 0, 0, 6],
        }
    }

    pub fn custom(slots: Vec<usize>) -> Self {
        Self { slots }
    }

    /// Resolve the panel address, or 0 when any hop is null/unreadable.
    pub fn resolve(&self, reader: &RemoteReader, ui_root: u64) -> u64 {
        let mut address = ui_root;
        for &slot in &self.slots {
            if address == 0 {
                return 0;
            }
            let frame: UiElementFrame = reader.read(address);
            let children = frame.children;
            address = children.pointer_at(reader, slot);
        }
        address
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use atlas_graph::records::UiElementFrame;
    use atlas_memory::{bytes_of, ForeignVec, FromMemory, ImageSource};

    fn element_with_children(image: &mut ImageSource, addr: u64, children: &[u64]) {
        let slots_addr = addr + 0x1000;
        for (i, &child) in children.iter().enumerate() {
            image.write(slots_addr + i as u64 * 8, &child.to_le_bytes());
        }
        let mut frame = UiElementFrame::zeroed();
        let end = slots_addr + children.len() as u64 * 8;
        frame.children = ForeignVec::new(slots_addr, end, end);
        image.write(addr, &bytes_of(&frame));
    }

    #[test]
    fn resolves_child_chain() {
        let mut image = ImageSource::new(0x10_0000, Vec::new());
        element_with_children(&mut image, 0x10_0000, &[0, 0x20_0000]);
        element_with_children(&mut image, 0x20_0000, &[0x30_0000]);
        let reader = RemoteReader::from_image(image);

        let path = PanelPath::custom(vec![1, 0]);
        assert_eq!(path.resolve(&reader, 0x10_0000), 0x30_0000);
    }

    #[test]
    fn out_of_range_slot_resolves_to_null() {
        let mut image = ImageSource::new(0x10_0000, Vec::new());
        element_with_children(&mut image, 0x10_0000, &[0x20_0000]);
        let reader = RemoteReader::from_image(image);

        let path = PanelPath::custom(vec![5]);
        assert_eq!(path.resolve(&reader, 0x10_0000), 0);
    }

    #[test]
    fn null_hop_short_circuits() {
        let mut image = ImageSource::new(0x10_0000, Vec::new());
        element_with_children(&mut image, 0x10_0000, &[0]);
        let reader = RemoteReader::from_image(image);

        let path = PanelPath::custom(vec![0, 3, 1]);
        assert_eq!(path.resolve(&reader, 0x10_0000), 0);
    }
}
