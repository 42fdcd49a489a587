use std::io::{self, BufRead};

use folio::{
    application::error::AppError, config::LoginArgs, config::Settings, infra::error::InfraError,
};

use super::session_guard;

pub fn login(settings: &Settings, args: LoginArgs) -> Result<(), AppError> {
    let secret = match args.secret {
        Some(secret) => secret,
        None => read_secret()?,
    };

    let mut guard = session_guard(settings);
    guard.login(&secret)?;
    println!("logged in");
    Ok(())
}

pub fn logout(settings: &Settings) -> Result<(), AppError> {
    session_guard(settings).logout()?;
    println!("logged out");
    Ok(())
}

fn read_secret() -> Result<String, AppError> {
    eprintln!("admin secret:");
    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .map_err(InfraError::from)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}
