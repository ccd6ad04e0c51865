// SYNOID Storyboard Export - xmeml Timeline
// Copyright (c) 2026 Xing_The_Creator | SYNOID
//
// Interchange XML for NLEs that read xmeml (Premiere, Resolve). Media paths
// are relative to the archive layout: `videos/<file>` and `audio/<file>`.

use super::{to_frames, Timeline};
use std::collections::HashMap;

pub const FILE_NAME: &str = "timeline.xml";
pub const VIDEO_DIR: &str = "videos";
pub const AUDIO_DIR: &str = "audio";

pub fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

fn rate(fps: u32) -> String {
    format!("<rate><timebase>{}</timebase><ntsc>FALSE</ntsc></rate>", fps)
}

/// Render `timeline` at a constant `fps`.
pub fn render(timeline: &Timeline, fps: u32) -> String {
    let frames = |s: f64| to_frames(s, fps);
    let total_frames = frames(timeline.total_duration());
    let narration_name = timeline.narration.file_name();

    let mut xml = String::new();
    xml.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    xml.push_str("<!DOCTYPE xmeml>\n");
    xml.push_str("<xmeml version=\"5\">\n");
    xml.push_str("  <sequence id=\"sequence-1\">\n");
    xml.push_str(&format!("    <name>{}</name>\n", escape_xml(&timeline.title)));
    xml.push_str(&format!("    <duration>{}</duration>\n", total_frames));
    xml.push_str(&format!("    {}\n", rate(fps)));
    xml.push_str("    <media>\n");

    // Video track; a file is described in full once, then referenced by id.
    xml.push_str("      <video>\n");
    xml.push_str("        <track>\n");
    let mut file_ids: HashMap<&str, String> = HashMap::new();
    for (n, p) in timeline.placements.iter().enumerate() {
        let start = frames(p.start);
        let length = frames(p.duration);
        xml.push_str(&format!("          <clipitem id=\"clipitem-{}\">\n", n + 1));
        xml.push_str(&format!("            <name>{}</name>\n", escape_xml(&p.file_name)));
        xml.push_str(&format!("            <duration>{}</duration>\n", length));
        xml.push_str(&format!("            {}\n", rate(fps)));
        xml.push_str(&format!("            <start>{}</start>\n", start));
        xml.push_str(&format!("            <end>{}</end>\n", start + length));
        xml.push_str("            <in>0</in>\n");
        xml.push_str(&format!("            <out>{}</out>\n", length));

        match file_ids.get(p.file_name.as_str()) {
            Some(id) => xml.push_str(&format!("            <file id=\"{}\"/>\n", id)),
            None => {
                let id = format!("file-{}", file_ids.len() + 1);
                xml.push_str(&format!("            <file id=\"{}\">\n", id));
                xml.push_str(&format!("              <name>{}</name>\n", escape_xml(&p.file_name)));
                xml.push_str(&format!(
                    "              <pathurl>{}/{}</pathurl>\n",
                    VIDEO_DIR,
                    escape_xml(&p.file_name)
                ));
                xml.push_str(&format!(
                    "              <duration>{}</duration>\n",
                    frames(p.asset.duration)
                ));
                xml.push_str(&format!("              {}\n", rate(fps)));
                xml.push_str("            </file>\n");
                file_ids.insert(p.file_name.as_str(), id);
            }
        }
        xml.push_str("          </clipitem>\n");
    }
    xml.push_str("        </track>\n");
    xml.push_str("      </video>\n");

    // Narration on A1 from zero.
    let narration_frames = frames(timeline.narration.duration);
    xml.push_str("      <audio>\n");
    xml.push_str("        <track>\n");
    xml.push_str("          <clipitem id=\"clipitem-narration\">\n");
    xml.push_str(&format!("            <name>{}</name>\n", escape_xml(&narration_name)));
    xml.push_str(&format!("            <duration>{}</duration>\n", narration_frames));
    xml.push_str(&format!("            {}\n", rate(fps)));
    xml.push_str("            <start>0</start>\n");
    xml.push_str(&format!("            <end>{}</end>\n", narration_frames));
    xml.push_str("            <in>0</in>\n");
    xml.push_str(&format!("            <out>{}</out>\n", narration_frames));
    xml.push_str("            <file id=\"file-narration\">\n");
    xml.push_str(&format!("              <name>{}</name>\n", escape_xml(&narration_name)));
    xml.push_str(&format!(
        "              <pathurl>{}/{}</pathurl>\n",
        AUDIO_DIR,
        escape_xml(&narration_name)
    ));
    xml.push_str(&format!("              <duration>{}</duration>\n", narration_frames));
    xml.push_str(&format!("              {}\n", rate(fps)));
    xml.push_str("            </file>\n");
    xml.push_str("          </clipitem>\n");
    xml.push_str("        </track>\n");
    xml.push_str("      </audio>\n");
    xml.push_str("    </media>\n");

    // One marker per block so the editor can see where the script lands.
    for p in &timeline.placements {
        let at = frames(p.start);
        xml.push_str("    <marker>\n");
        xml.push_str(&format!("      <name>{}</name>\n", escape_xml(&p.time_label)));
        xml.push_str(&format!("      <in>{}</in>\n", at));
        xml.push_str(&format!("      <out>{}</out>\n", at));
        xml.push_str("    </marker>\n");
    }

    xml.push_str("  </sequence>\n");
    xml.push_str("</xmeml>\n");
    xml
}
