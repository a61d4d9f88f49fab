//! Context assembly — builds the full generation request payload.
//!
//! Pure: same inputs, same output, no side effects beyond a warning log when
//! a text attachment fails to decode. Knowledge sections are appended to the
//! persona's system instruction in a fixed order (global first, then
//! project), each with its framing header, so the backend sees reference
//! material before task-specific files.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use cortex_core::backend::{ContentPart, ContentTurn};
use cortex_core::error::AssemblyError;
use cortex_core::knowledge::KnowledgeDocument;
use cortex_core::message::{Attachment, Message, Role};
use cortex_core::persona::Persona;
use tracing::warn;

const GLOBAL_SECTION_HEADER: &str = "\n\n### GLOBAL KNOWLEDGE BASE (REFERENCE LIBRARY) ###\nYou have access to the following persistent reference materials (e.g., ML concepts, Agency Guidelines). Use these to ensure technical accuracy and consistency across all projects:\n\n";

const PROJECT_SECTION_HEADER: &str = "\n\n### PROJECT FILES (CURRENT CONTEXT) ###\nThe following files are specific to the ACTIVE PROJECT. This is your primary source of truth for data, specifications, and code for the current task:\n\n";

/// The assembled payload for one generation exchange.
#[derive(Debug, Clone, PartialEq)]
pub struct AssembledPrompt {
    /// Persona instruction plus knowledge sections.
    pub system_instruction: String,

    /// Ordered content turns: prior history, then the new user turn.
    pub contents: Vec<ContentTurn>,
}

/// Assemble the full request payload for one exchange.
///
/// `history` is the conversation before the new submission; messages flagged
/// as errors are excluded. Fails fast when there is nothing to send.
pub fn assemble(
    history: &[Message],
    new_text: &str,
    attachment: Option<&Attachment>,
    persona: &Persona,
    project_docs: &[KnowledgeDocument],
    global_docs: &[KnowledgeDocument],
) -> Result<AssembledPrompt, AssemblyError> {
    if new_text.trim().is_empty() && attachment.is_none() {
        return Err(AssemblyError::EmptySubmission);
    }

    let system_instruction = build_system_instruction(persona, project_docs, global_docs);

    let mut contents: Vec<ContentTurn> = history
        .iter()
        .filter(|msg| !msg.is_error)
        .map(|msg| {
            let mut parts = Vec::new();
            if let Some(att) = &msg.attachment {
                parts.extend(attachment_parts(att));
            }
            if !msg.text.is_empty() {
                parts.push(ContentPart::Text(msg.text.clone()));
            }
            match msg.role {
                Role::User => ContentTurn::user(parts),
                Role::Model => ContentTurn::model(parts),
            }
        })
        .collect();

    let mut current_parts = Vec::new();
    if let Some(att) = attachment {
        current_parts.extend(attachment_parts(att));
    }
    current_parts.push(ContentPart::Text(new_text.to_string()));
    contents.push(ContentTurn::user(current_parts));

    Ok(AssembledPrompt {
        system_instruction,
        contents,
    })
}

/// Persona instruction with the knowledge sections appended.
fn build_system_instruction(
    persona: &Persona,
    project_docs: &[KnowledgeDocument],
    global_docs: &[KnowledgeDocument],
) -> String {
    let mut instruction = persona.system_instruction.clone();

    if !global_docs.is_empty() {
        let body: Vec<String> = global_docs
            .iter()
            .map(|doc| {
                format!(
                    "--- REFERENCE DOC ({}) ---\n{}\n---------------------------",
                    doc.name, doc.content
                )
            })
            .collect();
        instruction.push_str(GLOBAL_SECTION_HEADER);
        instruction.push_str(&body.join("\n\n"));
    }

    if !project_docs.is_empty() {
        let body: Vec<String> = project_docs
            .iter()
            .map(|doc| {
                format!(
                    "--- PROJECT FILE ({}) ---\n{}\n---------------------------",
                    doc.name, doc.content
                )
            })
            .collect();
        instruction.push_str(PROJECT_SECTION_HEADER);
        instruction.push_str(&body.join("\n\n"));
    }

    instruction
}

/// Convert an attachment into content parts.
///
/// Images and PDFs pass through as inline binary. Everything else is decoded
/// from base64 into a framed text block; an undecodable payload is skipped
/// with a warning, never an error.
fn attachment_parts(attachment: &Attachment) -> Vec<ContentPart> {
    if attachment.is_inline() {
        return vec![ContentPart::Inline {
            mime_type: attachment.mime_type.clone(),
            data: attachment.data.clone(),
        }];
    }

    match BASE64.decode(&attachment.data) {
        Ok(bytes) => {
            let decoded = String::from_utf8_lossy(&bytes);
            let name = attachment.file_name.as_deref().unwrap_or("attachment");
            vec![ContentPart::Text(format!(
                "[Context: Attached file '{name}']\n{decoded}\n---"
            ))]
        }
        Err(e) => {
            warn!(error = %e, "Failed to decode attachment text, skipping");
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cortex_core::message::AttachmentKind;
    use cortex_core::persona::{IconId, ModelPreference, PersonaKey};

    fn persona() -> Persona {
        Persona {
            key: PersonaKey::Engineer,
            name: "Data Engineer".into(),
            title: "Pipelines".into(),
            description: "Moves data".into(),
            system_instruction: "You are a Senior Data Engineer.".into(),
            model_preference: ModelPreference::Fast,
            color: "#10b981".into(),
            icon: IconId::Cpu,
        }
    }

    fn doc(name: &str, content: &str) -> KnowledgeDocument {
        KnowledgeDocument::new("1", name, "text/plain", content)
    }

    #[test]
    fn rejects_empty_submission() {
        let result = assemble(&[], "   ", None, &persona(), &[], &[]);
        assert!(matches!(result, Err(AssemblyError::EmptySubmission)));
    }

    #[test]
    fn attachment_alone_is_a_valid_submission() {
        let att = Attachment {
            kind: AttachmentKind::Image,
            data: "aGk=".into(),
            mime_type: "image/png".into(),
            file_name: None,
        };
        let result = assemble(&[], "", Some(&att), &persona(), &[], &[]);
        assert!(result.is_ok());
    }

    #[test]
    fn bare_instruction_without_documents() {
        let prompt = assemble(&[], "hello", None, &persona(), &[], &[]).unwrap();
        assert_eq!(prompt.system_instruction, "You are a Senior Data Engineer.");
        assert_eq!(prompt.contents.len(), 1);
        assert_eq!(
            prompt.contents[0].parts,
            vec![ContentPart::Text("hello".into())]
        );
    }

    #[test]
    fn global_section_precedes_project_section() {
        let prompt = assemble(
            &[],
            "hi",
            None,
            &persona(),
            &[doc("plan.md", "the plan")],
            &[doc("glossary.md", "the terms")],
        )
        .unwrap();

        let sys = &prompt.system_instruction;
        let global_at = sys
            .find("### GLOBAL KNOWLEDGE BASE (REFERENCE LIBRARY) ###")
            .unwrap();
        let project_at = sys.find("### PROJECT FILES (CURRENT CONTEXT) ###").unwrap();
        assert!(global_at < project_at);
        assert!(sys.contains("--- REFERENCE DOC (glossary.md) ---\nthe terms\n---------------------------"));
        assert!(sys.contains("--- PROJECT FILE (plan.md) ---\nthe plan\n---------------------------"));
        assert!(sys.starts_with("You are a Senior Data Engineer.\n\n### GLOBAL"));
    }

    #[test]
    fn multiple_documents_joined_with_blank_line() {
        let prompt = assemble(
            &[],
            "hi",
            None,
            &persona(),
            &[],
            &[doc("a.md", "A"), doc("b.md", "B")],
        )
        .unwrap();
        assert!(prompt.system_instruction.contains(
            "--- REFERENCE DOC (a.md) ---\nA\n---------------------------\n\n--- REFERENCE DOC (b.md) ---\nB\n---------------------------"
        ));
    }

    #[test]
    fn error_messages_are_excluded_from_history() {
        let mut failed = Message::model("Connection Error: Unable to reach the Cortex Neural Network.");
        failed.is_error = true;
        let history = vec![Message::user("first"), failed, Message::model("reply")];

        let prompt = assemble(&history, "second", None, &persona(), &[], &[]).unwrap();
        assert_eq!(prompt.contents.len(), 3); // user, model, new user
        assert!(
            prompt
                .contents
                .iter()
                .all(|t| t.parts != vec![ContentPart::Text(
                    "Connection Error: Unable to reach the Cortex Neural Network.".into()
                )])
        );
    }

    #[test]
    fn inline_attachments_pass_through_as_binary() {
        let att = Attachment {
            kind: AttachmentKind::File,
            data: "JVBERi0=".into(),
            mime_type: "application/pdf".into(),
            file_name: Some("report.pdf".into()),
        };
        let prompt = assemble(&[], "summarize", Some(&att), &persona(), &[], &[]).unwrap();
        assert_eq!(
            prompt.contents[0].parts[0],
            ContentPart::Inline {
                mime_type: "application/pdf".into(),
                data: "JVBERi0=".into(),
            }
        );
        assert_eq!(
            prompt.contents[0].parts[1],
            ContentPart::Text("summarize".into())
        );
    }

    #[test]
    fn text_attachments_are_decoded_into_a_context_block() {
        // "name,value\n1,2"
        let att = Attachment {
            kind: AttachmentKind::File,
            data: BASE64.encode("name,value\n1,2"),
            mime_type: "text/csv".into(),
            file_name: Some("data.csv".into()),
        };
        let prompt = assemble(&[], "analyze", Some(&att), &persona(), &[], &[]).unwrap();
        assert_eq!(
            prompt.contents[0].parts[0],
            ContentPart::Text("[Context: Attached file 'data.csv']\nname,value\n1,2\n---".into())
        );
    }

    #[test]
    fn undecodable_text_attachment_is_skipped_not_fatal() {
        let att = Attachment {
            kind: AttachmentKind::File,
            data: "%%% not base64 %%%".into(),
            mime_type: "text/plain".into(),
            file_name: Some("weird.txt".into()),
        };
        let prompt = assemble(&[], "look at this", Some(&att), &persona(), &[], &[]).unwrap();
        assert_eq!(
            prompt.contents[0].parts,
            vec![ContentPart::Text("look at this".into())]
        );
    }

    #[test]
    fn history_roles_map_to_turn_roles() {
        use cortex_core::backend::TurnRole;
        let history = vec![Message::user("q"), Message::model("a")];
        let prompt = assemble(&history, "next", None, &persona(), &[], &[]).unwrap();
        assert_eq!(prompt.contents[0].role, TurnRole::User);
        assert_eq!(prompt.contents[1].role, TurnRole::Model);
        assert_eq!(prompt.contents[2].role, TurnRole::User);
    }

    #[test]
    fn history_attachments_are_carried_forward() {
        let att = Attachment {
            kind: AttachmentKind::Image,
            data: "aW1n".into(),
            mime_type: "image/jpeg".into(),
            file_name: None,
        };
        let history = vec![Message::user("see image").with_attachment(att)];
        let prompt = assemble(&history, "and now?", None, &persona(), &[], &[]).unwrap();
        assert_eq!(prompt.contents[0].parts.len(), 2);
        assert!(matches!(
            prompt.contents[0].parts[0],
            ContentPart::Inline { .. }
        ));
    }
}
