/// Text shown next to the pointer when hovering a picked object
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tooltip {
    pub lines: Vec<String>,
}

impl Tooltip {
    pub fn new(lines: impl IntoIterator<Item = String>) -> Self {
        Self {
            lines: lines.into_iter().collect(),
        }
    }

    /// Widest line in characters
    pub fn width(&self) -> usize {
        self.lines.iter().map(|l| l.chars().count()).max().unwrap_or(0)
    }
}

/// Surface the hover path writes tooltips to
pub trait TooltipSink {
    /// Show `content` at a terminal cell position
    fn show(&mut self, content: Tooltip, position: (u16, u16));
    fn hide(&mut self);
}

/// Floating tooltip drawn over the map. Hiding keeps the last content so a
/// redraw can fade it out, matching show/hide toggling opacity.
#[derive(Debug, Default)]
pub struct TerminalTooltip {
    content: Option<Tooltip>,
    position: (u16, u16),
    visible: bool,
}

impl TerminalTooltip {
    pub fn new() -> Self {
        Self::default()
    }

    /// Content and position while visible
    pub fn visible(&self) -> Option<(&Tooltip, (u16, u16))> {
        match (&self.content, self.visible) {
            (Some(content), true) => Some((content, self.position)),
            _ => None,
        }
    }
}

impl TooltipSink for TerminalTooltip {
    fn show(&mut self, content: Tooltip, position: (u16, u16)) {
        self.content = Some(content);
        self.position = position;
        self.visible = true;
    }

    fn hide(&mut self) {
        self.visible = false;
    }
}
