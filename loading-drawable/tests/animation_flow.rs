//! # 动画流程集成测试
//!
//! 测试 factory → AnimationDriver → LoadingRenderer → RecordingCanvas 的完整链路。
//! 宿主时钟由固定步长模拟。

use std::time::Duration;

use loading_drawable::renderer::{
    BalloonRenderer, ElectricFanRenderer, GearRenderer, SwapRenderer,
};
use loading_drawable::{
    AnimationDriver, ColorFilter, DrawOp, DrawableError, LoadingDrawable, LoadingRenderer,
    RecordingCanvas, Rect, RendererConfig, RendererKind, create_with,
};

const FRAME: Duration = Duration::from_millis(16);

/// 以固有尺寸创建并启动
fn started(kind: RendererKind) -> LoadingDrawable {
    let mut drawable = LoadingDrawable::from_kind(kind);
    let bounds = Rect::from_size(drawable.intrinsic_width(), drawable.intrinsic_height());
    drawable.on_bounds_changed(bounds);
    drawable.start();
    drawable
}

fn record(drawable: &LoadingDrawable) -> Vec<DrawOp> {
    let mut canvas = RecordingCanvas::new();
    drawable.paint(&mut canvas);
    canvas.take_ops()
}

/// 所有种类都能跑满一个多周期，每帧 save/restore 成对
#[test]
fn test_every_kind_runs_cycles() {
    for kind in RendererKind::ALL {
        let mut drawable = started(kind);
        let frames = drawable.renderer().duration().as_millis() as usize / 16 * 2;
        let mut painted = 0;

        for _ in 0..frames {
            assert!(drawable.advance(FRAME).is_some());
            let mut canvas = RecordingCanvas::new();
            drawable.paint(&mut canvas);
            assert_eq!(canvas.depth(), 0, "{kind} 未恢复画布状态");
            if canvas.paint_count() > 0 {
                painted += 1;
            }
        }

        assert!(drawable.driver().cycle() >= 1, "{kind} 没有进入第二轮");
        assert!(painted > 0, "{kind} 没有绘制任何内容");
    }
}

/// 相同的输入序列产生相同的绘制结果（包括带随机数的渲染器）
#[test]
fn test_same_inputs_same_frames() {
    for kind in RendererKind::ALL {
        let mut a = started(kind);
        let mut b = started(kind);
        for frame in 0..90 {
            a.advance(FRAME);
            b.advance(FRAME);
            if frame % 15 == 0 {
                assert_eq!(record(&a), record(&b), "{kind} 第 {frame} 帧不一致");
            }
        }
    }
}

/// 重新启动后回到与首次启动相同的状态
#[test]
fn test_restart_replays_from_scratch() {
    for kind in [
        RendererKind::CircleBrood,
        RendererKind::DayNight,
        RendererKind::ElectricFan,
        RendererKind::WaterBottle,
    ] {
        let mut drawable = started(kind);
        let first = record(&drawable);
        for _ in 0..200 {
            drawable.advance(FRAME);
        }
        drawable.stop();
        assert!(drawable.advance(FRAME).is_none());

        drawable.start();
        assert_eq!(record(&drawable), first, "{kind} 重启后首帧不同");
    }
}

/// Gear：0~30% 放大，30%~70% 修剪，70%~100% 缩小，每轮整组旋转 360°
#[test]
fn test_gear_cycle_phases() {
    let mut renderer = GearRenderer::new();
    renderer.on_bounds_changed(Rect::from_size(56.0, 56.0));
    let mut driver = AnimationDriver::new();
    driver.start(&mut renderer);

    let step = Duration::from_millis(10);
    let mut last_scale = renderer.scale();
    let mut last_rotation = renderer.group_rotation();
    let mut shrank = false;

    while driver.cycle() == 0 {
        let Some(tick) = driver.advance(step, &mut renderer) else {
            panic!("驱动器意外停止");
        };
        if tick.repeated {
            break;
        }
        let progress = tick.progress;
        if progress <= 0.3 {
            assert!(renderer.scale() >= last_scale);
        } else if progress <= 0.7 {
            assert!(renderer.scale() > 0.99);
            assert!(renderer.group_rotation() >= last_rotation);
        } else {
            assert!(renderer.scale() <= last_scale);
            shrank = true;
        }
        last_scale = renderer.scale();
        last_rotation = renderer.group_rotation();
    }

    assert!(shrank);
    assert!(last_scale < 0.05);
    // 最后一次采样略早于 70%
    assert!((last_rotation - 360.0).abs() < 3.0);

    // 第二轮在上一轮的基础上继续旋转
    while driver.progress() <= 0.7 {
        driver.advance(step, &mut renderer);
    }
    assert!(renderer.group_rotation() > 360.0);
}

/// Swap：交换下标为 floor(progress * 5)，随周期循环
#[test]
fn test_swap_index_cycles() {
    let mut renderer = SwapRenderer::new();
    renderer.on_bounds_changed(Rect::from_size(165.0, 75.0));
    let mut driver = AnimationDriver::new();
    driver.start(&mut renderer);
    assert_eq!(renderer.swap_index(), 0);

    let mut visited = vec![renderer.swap_index()];
    for _ in 0..400 {
        let Some(tick) = driver.advance(FRAME, &mut renderer) else {
            panic!("驱动器意外停止");
        };
        let expected = ((tick.progress * 5.0) as usize).min(4);
        assert_eq!(renderer.swap_index(), expected);
        if visited.last() != Some(&expected) {
            visited.push(expected);
        }
    }

    assert_eq!(&visited[..6], &[0, 1, 2, 3, 4, 0]);
}

/// ElectricFan：叶子在一轮内出现，reset 后清空
#[test]
fn test_electric_fan_leaves_cleared() {
    let mut renderer = ElectricFanRenderer::new();
    renderer.on_bounds_changed(Rect::from_size(
        renderer.width(),
        renderer.height(),
    ));
    let mut driver = AnimationDriver::new();
    driver.start(&mut renderer);

    let mut max_live = 0;
    while driver.cycle() == 0 {
        driver.advance(FRAME, &mut renderer);
        max_live = max_live.max(renderer.live_leaf_count());
    }
    assert!(max_live > 0);

    renderer.reset();
    assert_eq!(renderer.live_leaf_count(), 0);
}

/// Balloon：吸气阶段显示 10%，结束时显示 100%
#[test]
fn test_balloon_text() {
    let mut renderer = BalloonRenderer::new();
    renderer.on_bounds_changed(Rect::from_size(200.0, 150.0));
    let mut driver = AnimationDriver::new();
    driver.start(&mut renderer);

    let mut last_text = String::new();
    loop {
        let Some(tick) = driver.advance(FRAME, &mut renderer) else {
            panic!("驱动器意外停止");
        };
        if tick.repeated {
            break;
        }
        if tick.progress <= 0.4 {
            assert_eq!(renderer.progress_text(), "10%");
        }
        last_text = renderer.progress_text().to_owned();
    }
    assert_eq!(last_text, "100%");

    let mut canvas = RecordingCanvas::new();
    renderer.paint(&mut canvas);
    assert!(
        canvas
            .ops()
            .iter()
            .any(|op| matches!(op, DrawOp::Text { text, .. } if text == renderer.progress_text()))
    );
}

/// JSON 预设经工厂构造后生效
#[test]
fn test_config_from_json() {
    let config = RendererConfig::from_json(
        r##"{ "kind": "gear", "duration_ms": 2000, "color": "#FFFF8800", "gear_count": 6 }"##,
    )
    .unwrap();
    let renderer = create_with(&config);
    assert_eq!(renderer.kind(), RendererKind::Gear);
    assert_eq!(renderer.duration(), Duration::from_millis(2000));

    // 非正值保留默认
    let config = RendererConfig::from_json(r#"{ "kind": "swap", "duration_ms": -5 }"#).unwrap();
    let renderer = create_with(&config);
    assert_eq!(renderer.duration(), Duration::from_millis(2500));
}

/// 配置种类与渲染器不匹配时报错，参数不变
#[test]
fn test_config_kind_mismatch() {
    let mut drawable = LoadingDrawable::from_kind(RendererKind::Fish);
    let before = drawable.renderer().duration();
    let config = RendererConfig::from_json(r#"{ "kind": "gear", "duration_ms": 100 }"#).unwrap();

    let err = drawable.renderer_mut().configure(&config).unwrap_err();
    assert!(matches!(err, DrawableError::ConfigKindMismatch { .. }));
    assert_eq!(drawable.renderer().duration(), before);
}

/// 宿主设置的颜色滤镜带到每一支画笔上
#[test]
fn test_color_filter_reaches_paints() {
    let filter = Some(ColorFilter::Tint(loading_drawable::Color::RED));
    for kind in RendererKind::ALL {
        let mut drawable = started(kind);
        drawable.set_color_filter(filter);
        for _ in 0..30 {
            drawable.advance(FRAME);
        }
        for op in record(&drawable) {
            if let Some(paint) = op.paint() {
                assert_eq!(paint.color_filter, filter, "{kind} 的画笔缺少滤镜");
            }
        }
    }
}
