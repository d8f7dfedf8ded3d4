use eframe::egui::{self, Color32, FontId, Stroke, text::LayoutJob, text::TextFormat};
use pulldown_cmark::{Event, HeadingLevel, Options, Parser, Tag, TagEnd};

const BODY_SIZE: f32 = 14.0;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockKind {
    Paragraph,
    Heading(u8),
    ListItem { depth: usize, marker: String },
    Code,
    Rule,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Span {
    pub text: String,
    pub strong: bool,
    pub emphasis: bool,
    pub code: bool,
    pub strike: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub kind: BlockKind,
    pub spans: Vec<Span>,
}

impl Block {
    fn new(kind: BlockKind) -> Self {
        Self {
            kind,
            spans: Vec::new(),
        }
    }

    pub fn plain_text(&self) -> String {
        self.spans.iter().map(|span| span.text.as_str()).collect()
    }
}

#[derive(Default)]
struct BlockBuilder {
    blocks: Vec<Block>,
    current: Option<Block>,
    /// Next number for each open list; `None` for bullet lists.
    lists: Vec<Option<u64>>,
    strong: usize,
    emphasis: usize,
    strike: usize,
}

impl BlockBuilder {
    fn flush(&mut self) {
        if let Some(block) = self.current.take() {
            if !block.spans.is_empty() || block.kind == BlockKind::Rule {
                self.blocks.push(block);
            }
        }
    }

    fn start(&mut self, kind: BlockKind) {
        self.flush();
        self.current = Some(Block::new(kind));
    }

    fn push_text(&mut self, text: &str, code: bool) {
        let span = Span {
            text: text.to_string(),
            strong: self.strong > 0,
            emphasis: self.emphasis > 0,
            code,
            strike: self.strike > 0,
        };
        self.current
            .get_or_insert_with(|| Block::new(BlockKind::Paragraph))
            .spans
            .push(span);
    }

    fn start_item(&mut self) {
        let depth = self.lists.len().saturating_sub(1);
        let marker = match self.lists.last_mut() {
            Some(Some(number)) => {
                let marker = format!("{number}.");
                *number += 1;
                marker
            }
            _ => "•".to_string(),
        };
        self.start(BlockKind::ListItem { depth, marker });
    }

    fn in_fresh_list_item(&self) -> bool {
        matches!(
            &self.current,
            Some(Block { kind: BlockKind::ListItem { .. }, spans }) if spans.is_empty()
        )
    }
}

/// Split markdown into styled blocks.
///
/// Raw HTML is not rendered. HTML block lines vanish entirely; inline tags
/// are removed while the text between them stays as plain text, so
/// `<b>x</b>` shows as `x`.
pub fn parse_blocks(markdown: &str) -> Vec<Block> {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_STRIKETHROUGH);

    let mut builder = BlockBuilder::default();
    for event in Parser::new_ext(markdown, options) {
        match event {
            Event::Start(Tag::Paragraph) => {
                if !builder.in_fresh_list_item() {
                    builder.start(BlockKind::Paragraph);
                }
            }
            Event::Start(Tag::Heading { level, .. }) => {
                builder.start(BlockKind::Heading(heading_level(level)));
            }
            Event::Start(Tag::CodeBlock(_)) => builder.start(BlockKind::Code),
            Event::Start(Tag::List(first)) => {
                builder.flush();
                builder.lists.push(first);
            }
            Event::Start(Tag::Item) => builder.start_item(),
            Event::Start(Tag::Strong) => builder.strong += 1,
            Event::Start(Tag::Emphasis) => builder.emphasis += 1,
            Event::Start(Tag::Strikethrough) => builder.strike += 1,
            Event::End(TagEnd::Strong) => builder.strong = builder.strong.saturating_sub(1),
            Event::End(TagEnd::Emphasis) => builder.emphasis = builder.emphasis.saturating_sub(1),
            Event::End(TagEnd::Strikethrough) => builder.strike = builder.strike.saturating_sub(1),
            Event::End(TagEnd::List(_)) => {
                builder.flush();
                builder.lists.pop();
            }
            Event::End(
                TagEnd::Paragraph | TagEnd::Heading(_) | TagEnd::CodeBlock | TagEnd::Item,
            ) => builder.flush(),
            Event::Text(text) => builder.push_text(&text, false),
            Event::Code(code) => builder.push_text(&code, true),
            Event::SoftBreak => builder.push_text(" ", false),
            Event::HardBreak => builder.push_text("\n", false),
            Event::Rule => {
                builder.start(BlockKind::Rule);
                builder.flush();
            }
            _ => {}
        }
    }
    builder.flush();
    builder.blocks
}

fn heading_level(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

/// Render markdown text inside the current ui.
pub fn render(ui: &mut egui::Ui, markdown: &str, color: Color32) {
    for block in parse_blocks(markdown) {
        match &block.kind {
            BlockKind::Rule => {
                ui.separator();
            }
            BlockKind::Code => {
                egui::Frame::new()
                    .fill(ui.visuals().extreme_bg_color)
                    .corner_radius(4.0)
                    .inner_margin(egui::Margin::same(6))
                    .show(ui, |ui| {
                        ui.label(
                            egui::RichText::new(block.plain_text().trim_end())
                                .monospace()
                                .color(color),
                        );
                    });
            }
            _ => {
                let job = layout_block(&block, color, ui.visuals().strong_text_color(), ui.available_width());
                ui.label(job);
            }
        }
    }
}

fn layout_block(block: &Block, color: Color32, strong_color: Color32, wrap_width: f32) -> LayoutJob {
    let mut job = LayoutJob::default();
    job.wrap.max_width = wrap_width;

    let size = match block.kind {
        BlockKind::Heading(1) => BODY_SIZE + 6.0,
        BlockKind::Heading(2) => BODY_SIZE + 4.0,
        BlockKind::Heading(_) => BODY_SIZE + 2.0,
        _ => BODY_SIZE,
    };
    let heading = matches!(block.kind, BlockKind::Heading(_));

    if let BlockKind::ListItem { depth, marker } = &block.kind {
        let prefix = format!("{}{marker} ", "    ".repeat(*depth));
        job.append(&prefix, 0.0, TextFormat::simple(FontId::proportional(size), color));
    }

    for span in &block.spans {
        let font_id = if span.code {
            FontId::monospace(size - 1.0)
        } else {
            FontId::proportional(size)
        };
        let format = TextFormat {
            font_id,
            color: if span.strong || heading { strong_color } else { color },
            italics: span.emphasis,
            strikethrough: if span.strike {
                Stroke::new(1.0, color)
            } else {
                Stroke::NONE
            },
            background: if span.code {
                Color32::from_black_alpha(24)
            } else {
                Color32::TRANSPARENT
            },
            ..Default::default()
        };
        job.append(&span.text, 0.0, format);
    }
    job
}
