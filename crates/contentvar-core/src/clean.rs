use crate::cleanup::remove_unknown_fields_contents;
use crate::defaults::apply_defaults_contents;
use crate::error::Result;
use crate::message::MessageObject;
use crate::model::{Content, Service};

/// Strip unknown fields, then fill defaults. The result is not re-validated.
pub fn clean(msg: MessageObject, service: &Service) -> Result<MessageObject> {
    clean_contents(msg, &service.outputs)
}

pub fn clean_contents(msg: MessageObject, contents: &[Content]) -> Result<MessageObject> {
    let mut cleaned = remove_unknown_fields_contents(msg, contents)?;
    apply_defaults_contents(&mut cleaned, contents)?;
    Ok(cleaned)
}
