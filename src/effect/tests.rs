use crate::effect::prelude::*;

#[tokio::test]
async fn test_pure_returns_value() {
    assert_eq!(pure::<_, String, ()>(42).run_standalone().await, Ok(42));
}

#[tokio::test]
async fn test_fail_returns_error() {
    let effect = fail::<i32, _, ()>("boom".to_string());
    assert_eq!(effect.run_standalone().await, Err("boom".to_string()));
}

#[tokio::test]
async fn test_map_skipped_on_failure() {
    let effect = fail::<i32, _, ()>("boom".to_string()).map(|x| x * 2);
    assert_eq!(effect.run_standalone().await, Err("boom".to_string()));
}

#[tokio::test]
async fn test_map_err_rewrites_error() {
    let effect = fail::<i32, _, ()>(3u8).map_err(|code| format!("code {}", code));
    assert_eq!(effect.run_standalone().await, Err("code 3".to_string()));
}

#[tokio::test]
async fn test_and_then_short_circuits() {
    let effect =
        pure::<_, String, ()>(1).and_then(|_| fail::<i32, _, ()>("second".to_string()));
    assert_eq!(effect.run_standalone().await, Err("second".to_string()));
}

#[tokio::test]
async fn test_from_fn_reads_environment() {
    #[derive(Clone)]
    struct Env {
        offset: i32,
    }

    let effect = from_fn(|env: &Env| Ok::<_, String>(env.offset + 1));
    assert_eq!(effect.run(&Env { offset: 9 }).await, Ok(10));
}

#[tokio::test]
async fn test_from_async_awaits() {
    let effect = from_async(|_: &()| async {
        tokio::task::yield_now().await;
        Ok::<_, String>("done")
    });
    assert_eq!(effect.run_standalone().await, Ok("done"));
}

#[tokio::test]
async fn test_from_result_passes_through() {
    assert_eq!(
        from_result::<i32, _, ()>(Err("no".to_string()))
            .run_standalone()
            .await,
        Err("no".to_string())
    );
}
