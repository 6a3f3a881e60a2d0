use serde::{Deserialize, Serialize};

use crate::image::ImageRef;
use crate::service::{EditPayload, UserFile};

/// Output aspect ratios the image model accepts for expansion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AspectRatio {
    Square,
    Portrait2x3,
    Landscape3x2,
    Portrait3x4,
    Landscape4x3,
    Portrait4x5,
    Landscape5x4,
    Portrait9x16,
    Landscape16x9,
    Ultrawide21x9,
}

impl AspectRatio {
    pub const ALL: [AspectRatio; 10] = [
        AspectRatio::Square,
        AspectRatio::Portrait2x3,
        AspectRatio::Landscape3x2,
        AspectRatio::Portrait3x4,
        AspectRatio::Landscape4x3,
        AspectRatio::Portrait4x5,
        AspectRatio::Landscape5x4,
        AspectRatio::Portrait9x16,
        AspectRatio::Landscape16x9,
        AspectRatio::Ultrawide21x9,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            AspectRatio::Square => "1:1",
            AspectRatio::Portrait2x3 => "2:3",
            AspectRatio::Landscape3x2 => "3:2",
            AspectRatio::Portrait3x4 => "3:4",
            AspectRatio::Landscape4x3 => "4:3",
            AspectRatio::Portrait4x5 => "4:5",
            AspectRatio::Landscape5x4 => "5:4",
            AspectRatio::Portrait9x16 => "9:16",
            AspectRatio::Landscape16x9 => "16:9",
            AspectRatio::Ultrawide21x9 => "21:9",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|ratio| ratio.as_str() == value.trim())
    }
}

/// Which builder produced a request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditKind {
    Inpaint,
    StyleFilter,
    Expansion,
}

impl EditKind {
    pub fn label(self) -> &'static str {
        match self {
            EditKind::Inpaint => "inpaint",
            EditKind::StyleFilter => "style filter",
            EditKind::Expansion => "expansion",
        }
    }
}

/// A reference image attached by the user
#[derive(Debug, Clone)]
pub struct Attachment {
    pub image: ImageRef,
    pub filename: String,
}

impl Attachment {
    pub fn new(image: ImageRef, filename: impl Into<String>) -> Self {
        Self {
            image,
            filename: filename.into(),
        }
    }
}

const INPAINT_MASKED: &str = "\
The second image is a black and white mask. Apply the requested change ONLY inside the white area of the mask. \
Every pixel under the black area must stay identical to the original image. \
Blend the edited region seamlessly with its surroundings, matching lighting, perspective and grain.";

const INPAINT_UNMASKED: &str = "\
Apply the requested change to the image while keeping everything that the request does not mention unchanged.";

const INPAINT_REFERENCES: &str = "\
Any additional images are visual references for the requested content. Use them as guidance, do not paste them.";

const STYLE_CONSTRAINTS: &str = "\
TECHNICAL CONSTRAINTS:
1. STRICTLY PRESERVE COMPOSITION: Do not change the subject's pose, the camera angle, or the placement of objects.
2. OUTPUT FORMAT: This is a style transfer. Keep the underlying structure of the image identical to the original, \
only changing the texture, lighting, and colors to match the requested style.";

const EXPANSION_INSTRUCTION: &str = "\
High-fidelity outpainting. Analyze the visual context of the original image and seamlessly extend the scenery \
into the empty areas. Ensure the person's face and features remain completely unchanged.";

const EXPANSION_CONSTRAINTS: &str = "\
Strictly maintain the continuity of existing lines, horizon, textures, lighting, and perspective. \
The transition must be invisible. Do not alter the style or content of the original center image.";

/// Everything needed for one call to the edit service
#[derive(Debug, Clone)]
pub struct EditRequest {
    pub kind: EditKind,
    pub prompt: String,
    pub base: ImageRef,
    pub mask: Option<ImageRef>,
    pub references: Vec<Attachment>,
    pub aspect_ratio: Option<AspectRatio>,
}

impl EditRequest {
    /// Mask-guided edit of the selected region
    pub fn inpaint(
        base: ImageRef,
        goal: &str,
        mask: Option<ImageRef>,
        references: Vec<Attachment>,
    ) -> Self {
        let mut prompt = format!("EDIT REQUEST: {}\n", goal.trim());
        prompt.push_str(if mask.is_some() {
            INPAINT_MASKED
        } else {
            INPAINT_UNMASKED
        });
        if !references.is_empty() {
            prompt.push('\n');
            prompt.push_str(INPAINT_REFERENCES);
        }

        Self {
            kind: EditKind::Inpaint,
            prompt,
            base,
            mask,
            references,
            aspect_ratio: None,
        }
    }

    /// Whole-image style transfer that keeps composition
    pub fn style_filter(base: ImageRef, style: &str) -> Self {
        Self {
            kind: EditKind::StyleFilter,
            prompt: format!("{}\n{}", style.trim(), STYLE_CONSTRAINTS),
            base,
            mask: None,
            references: Vec::new(),
            aspect_ratio: None,
        }
    }

    /// Outpaints the image to a new aspect ratio
    pub fn expansion(base: ImageRef, aspect_ratio: AspectRatio, context: Option<&str>) -> Self {
        let mut prompt = format!("{}\n{}", EXPANSION_INSTRUCTION, EXPANSION_CONSTRAINTS);
        if let Some(context) = context.map(str::trim).filter(|c| !c.is_empty()) {
            prompt.push_str("\nAdditional context/subject for extension: ");
            prompt.push_str(context);
        }

        Self {
            kind: EditKind::Expansion,
            prompt,
            base,
            mask: None,
            references: Vec::new(),
            aspect_ratio: Some(aspect_ratio),
        }
    }

    /// Serializes images into the data-URI wire format
    pub fn to_payload(&self) -> EditPayload {
        EditPayload {
            image_base64: self.base.to_data_uri(),
            prompt: self.prompt.clone(),
            mask_base64: self.mask.as_ref().map(|mask| mask.to_data_uri()),
            user_files: if self.references.is_empty() {
                None
            } else {
                Some(
                    self.references
                        .iter()
                        .map(|attachment| UserFile {
                            url: attachment.image.to_data_uri(),
                            media_type: attachment.image.mime().to_string(),
                            filename: attachment.filename.clone(),
                        })
                        .collect(),
                )
            },
            aspect_ratio: self.aspect_ratio.map(|ratio| ratio.as_str().to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::Image;

    fn img() -> ImageRef {
        Image::new_ref(vec![1u8, 2, 3], "image/jpeg")
    }

    #[test]
    fn test_inpaint_embeds_goal_and_mask_instruction() {
        let mask = Image::new_ref(vec![9u8], "image/png");
        let req = EditRequest::inpaint(img(), "  add a hat ", Some(mask), Vec::new());
        assert_eq!(req.kind, EditKind::Inpaint);
        assert!(req.prompt.starts_with("EDIT REQUEST: add a hat\n"));
        assert!(req.prompt.contains("white area of the mask"));
        assert!(!req.prompt.contains("visual references"));
    }

    #[test]
    fn test_inpaint_without_mask() {
        let refs = vec![Attachment::new(img(), "ref.jpg")];
        let req = EditRequest::inpaint(img(), "add a hat", None, refs);
        assert!(!req.prompt.contains("white area"));
        assert!(req.prompt.contains("visual references"));
    }

    #[test]
    fn test_style_filter_keeps_composition() {
        let req = EditRequest::style_filter(img(), "watercolor");
        assert!(req.prompt.starts_with("watercolor\n"));
        assert!(req.prompt.contains("STRICTLY PRESERVE COMPOSITION"));
        assert!(req.mask.is_none());
        assert!(req.aspect_ratio.is_none());
    }

    #[test]
    fn test_expansion_context_is_optional() {
        let plain = EditRequest::expansion(img(), AspectRatio::Landscape16x9, Some("   "));
        assert!(!plain.prompt.contains("Additional context"));
        assert!(plain.prompt.contains("face and features remain completely unchanged"));
        assert_eq!(plain.aspect_ratio, Some(AspectRatio::Landscape16x9));

        let with_context = EditRequest::expansion(img(), AspectRatio::Square, Some("a beach"));
        assert!(with_context
            .prompt
            .ends_with("Additional context/subject for extension: a beach"));
    }

    #[test]
    fn test_aspect_ratio_parse() {
        assert_eq!(AspectRatio::parse("16:9"), Some(AspectRatio::Landscape16x9));
        assert_eq!(AspectRatio::parse(" 1:1 "), Some(AspectRatio::Square));
        assert_eq!(AspectRatio::parse("7:3"), None);
    }
}
