use std::time::Duration;

use spindle_core::{Fault, Generator, Task};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    // (A) 即時完了する task：構築した時点で結果が読める
    let answer = Task::new(|_scope| async move { Ok(42) });
    println!(
        "immediate task: {}",
        *answer.get_result().expect("settled at construction")
    );

    // (B) task の合成：内側の task を同期的に完了まで駆動してから外側が続行する
    let chained = Task::new(|scope| async move {
        let base = Task::new(|_scope| async move { Ok(42) });
        let res = scope.join(base).await?;
        Ok(res + 23)
    });
    println!(
        "chained task: {}",
        *chained.get_result().expect("settled at construction")
    );

    // (C) timed pause：スレッドをブロックする簡易版（スケジューラは無い）
    let slept = Task::new(|scope| async move {
        println!("about to pause");
        scope.pause(Duration::from_millis(200)).await;
        println!("resumed");
        Ok(())
    });
    slept.get_result().expect("settled at construction");

    // (D) generator：呼び出し側が advance() で一つずつ引き出す
    let mut squares = Generator::new(|yielder| async move {
        for n in 1..=5 {
            yielder.emit(n * n).await;
        }
        Ok(())
    });
    print!("squares:");
    while squares.advance().expect("body does not fault") {
        print!(" {}", squares.current().expect("value just yielded"));
    }
    println!();

    // (E) body のエラーは保存され、観測した時点で表面化する
    let failing: Task<i32> =
        Task::new(|_scope| async move { Err(Fault::msg("intentional failure")) });
    match failing.get_result() {
        Ok(value) => println!("unexpected value: {}", *value),
        Err(err) => println!("failing task surfaced: {err}"),
    }
}
