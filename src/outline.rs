//! ASCII rendering of a funnel graph, for debugging and the CLI.

use std::fmt;

use crate::flow::{Block, FunnelFlow};
use crate::validator::{Highlights, InvalidOptionReason};

/// A wrapper to display a funnel as an indented tree, optionally annotated
/// with the validator's highlight sets.
pub struct FlowOutline<'a> {
    pub flow: &'a FunnelFlow,
    pub highlights: Option<&'a Highlights>,
}

impl<'a> FlowOutline<'a> {
    pub fn new(flow: &'a FunnelFlow) -> Self {
        FlowOutline {
            flow,
            highlights: None,
        }
    }

    pub fn with_highlights(flow: &'a FunnelFlow, highlights: &'a Highlights) -> Self {
        FlowOutline {
            flow,
            highlights: Some(highlights),
        }
    }
}

impl fmt::Display for FlowOutline<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Funnel ({} stage(s), {} block(s))",
            self.flow.stages.len(),
            self.flow.blocks.len()
        )?;
        let stage_count = self.flow.stages.len();
        for (index, stage) in self.flow.stages.iter().enumerate() {
            let is_last = index + 1 == stage_count;
            let marker = if is_last { "└── " } else { "├── " };
            let card = match stage.card_type {
                Some(card_type) => format!(" [{:?}]", card_type),
                None => String::new(),
            };
            writeln!(f, "{}{} ({}){}", marker, stage.name, stage.id, card)?;

            let child_prefix = if is_last { "    " } else { "│   " };
            let block_count = stage.block_ids.len();
            for (block_index, block_id) in stage.block_ids.iter().enumerate() {
                let block_last = block_index + 1 == block_count;
                match self.flow.blocks.get(block_id) {
                    Some(block) => self.fmt_block(f, block, child_prefix, block_last)?,
                    None => {
                        let marker = if block_last { "└── " } else { "├── " };
                        writeln!(f, "{}{}{} <missing block>", child_prefix, marker, block_id)?;
                    }
                }
            }
        }
        Ok(())
    }
}

impl FlowOutline<'_> {
    fn fmt_block(
        &self,
        f: &mut fmt::Formatter<'_>,
        block: &Block,
        prefix: &str,
        is_last: bool,
    ) -> fmt::Result {
        let marker = if is_last { "└── " } else { "├── " };
        let mut tags = String::new();
        if block.id == self.flow.start_block_id {
            tags.push_str(" [start]");
        }
        if block.send_dm_block {
            tags.push_str(" [send-dm]");
        }
        if let Some(h) = self.highlights {
            if h.orphaned_block_ids.iter().any(|id| *id == block.id) {
                tags.push_str(" [orphaned]");
            }
            if h.broken_block_ids.iter().any(|id| *id == block.id) {
                tags.push_str(" [broken]");
            }
        }
        writeln!(
            f,
            "{}{}{} \"{}\"{}",
            prefix,
            marker,
            block.id,
            truncate(&block.message, 32),
            tags
        )?;

        let child_prefix = format!("{}{}", prefix, if is_last { "    " } else { "│   " });
        let mut lines: Vec<String> = Vec::new();
        for (index, option) in block.options.iter().enumerate() {
            let target = option.next_block_id.as_deref().unwrap_or("<unconnected>");
            let invalid = self
                .highlights
                .and_then(|h| {
                    h.invalid_options
                        .iter()
                        .find(|o| o.block_id == block.id && o.option_index == index)
                })
                .map(|o| format!(" [invalid: {}]", reason_label(o.reason)))
                .unwrap_or_default();
            lines.push(format!(
                "option {} \"{}\" -> {}{}",
                index,
                truncate(&option.text, 24),
                target,
                invalid
            ));
        }
        if let Some(target) = &block.upsell_block_id {
            lines.push(format!(
                "upsell -> {}{}",
                target,
                style_label(block.upsell_style.map(|s| s.0))
            ));
        }
        if let Some(target) = &block.downsell_block_id {
            lines.push(format!(
                "downsell -> {}{}",
                target,
                style_label(block.downsell_style.map(|s| s.0))
            ));
        }

        let count = lines.len();
        for (index, line) in lines.iter().enumerate() {
            let marker = if index + 1 == count {
                "└── "
            } else {
                "├── "
            };
            writeln!(f, "{}{}{}", child_prefix, marker, line)?;
        }
        Ok(())
    }
}

fn reason_label(reason: InvalidOptionReason) -> &'static str {
    match reason {
        InvalidOptionReason::MissingTarget => "missing target",
        InvalidOptionReason::TargetOutsideStages => "target outside stages",
        InvalidOptionReason::TargetInEarlierStage => "target in earlier stage",
    }
}

fn style_label(style: Option<u8>) -> String {
    match style {
        Some(id) => format!(" (style {})", id),
        None => String::new(),
    }
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max).collect();
        format!("{}…", cut)
    }
}
