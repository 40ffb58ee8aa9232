use clap::{Arg, Command};

pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new("media-upload-url")
                .long("media-upload-url")
                .help("Media host upload endpoint; uploads are refused when unset")
                .env("FOLIO_MEDIA_UPLOAD_URL"),
        )
        .arg(
            Arg::new("media-api-key")
                .long("media-api-key")
                .help("Bearer key for the media host upload endpoint")
                .env("FOLIO_MEDIA_API_KEY"),
        )
        .arg(
            Arg::new("media-max-bytes")
                .long("media-max-bytes")
                .help("Maximum accepted upload size in bytes")
                .env("FOLIO_MEDIA_MAX_BYTES")
                .default_value("5242880")
                .value_parser(clap::value_parser!(usize)),
        )
}
