use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    match giftdesk_server::start_server().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("event=server_exit module=server status=error error={e}");
            eprintln!("giftdesk: {e}");
            ExitCode::FAILURE
        }
    }
}
