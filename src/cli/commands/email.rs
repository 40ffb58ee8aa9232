use clap::{Arg, Command};

pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new("contact-relay-url")
                .long("contact-relay-url")
                .help("Webhook that relays contact messages; messages are only logged when unset")
                .env("FOLIO_CONTACT_RELAY_URL"),
        )
        .arg(
            Arg::new("contact-to")
                .long("contact-to")
                .help("Destination address included in relayed contact messages")
                .env("FOLIO_CONTACT_TO"),
        )
}
