use super::Reply;
use crate::driver::session::KEYCODE_HOME;
use crate::driver::Driver;
use crate::error::Result;

pub async fn go_back(driver: &dyn Driver) -> Result<Reply> {
    driver.back().await?;
    Ok(Reply::ok("Pressed back button"))
}

/// Android only: sends the home keycode.
pub async fn go_home(driver: &dyn Driver) -> Result<Reply> {
    driver.press_keycode(KEYCODE_HOME).await?;
    Ok(Reply::ok("Pressed home button"))
}

pub async fn launch_app(driver: &dyn Driver) -> Result<Reply> {
    driver.launch_app().await?;
    Ok(Reply::ok("App launched"))
}

pub async fn close_app(driver: &dyn Driver) -> Result<Reply> {
    driver.close_app().await?;
    Ok(Reply::ok("App closed"))
}

pub async fn reset_app(driver: &dyn Driver) -> Result<Reply> {
    driver.reset_app().await?;
    Ok(Reply::ok("App reset"))
}

pub async fn get_page_source(driver: &dyn Driver) -> Result<Reply> {
    let source = driver.page_source().await?;
    Ok(Reply::empty().with("source", source))
}
