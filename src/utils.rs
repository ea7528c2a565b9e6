use core::any::Any;

/// Best-effort extraction of the message carried by a panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&'static str>() {
        (*message).to_owned()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        String::from("Box<dyn Any>")
    }
}

#[cfg(test)]
mod tests {
    use super::panic_message;
    use std::panic;

    #[test]
    fn extracts_static_and_formatted_messages() {
        let payload = panic::catch_unwind(|| panic!("static")).unwrap_err();
        assert_eq!(panic_message(&*payload), "static");

        let code = 7;
        let payload = panic::catch_unwind(|| panic!("code {code}")).unwrap_err();
        assert_eq!(panic_message(&*payload), "code 7");

        let payload = panic::catch_unwind(|| panic::panic_any(42_u8)).unwrap_err();
        assert_eq!(panic_message(&*payload), "Box<dyn Any>");
    }
}
