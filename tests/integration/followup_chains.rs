mod helpers;

use helpers::{answer, context, record, ScriptedExchange, ScriptedResolver};
use quill_dns_application::ports::Resolution;
use quill_dns_application::{HookPipeline, HookStage};
use quill_dns_domain::{
    rcode, EngineConfig, HookError, QueryContext, RecordSection, RecordType,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

fn build_pipeline(
    resolver: Arc<ScriptedResolver>,
    exchange: Arc<ScriptedExchange>,
    config: EngineConfig,
    wire: impl FnOnce(
        quill_dns_application::HookPipelineBuilder,
    ) -> quill_dns_application::HookPipelineBuilder,
) -> HookPipeline {
    wire(HookPipeline::builder(config)).build(resolver, exchange)
}

#[tokio::test]
async fn test_chase_cname_noop_without_cname() {
    let resolver = Arc::new(ScriptedResolver::new());
    let pipeline = build_pipeline(
        resolver.clone(),
        Arc::new(ScriptedExchange::new()),
        EngineConfig::default(),
        |b| {
            b.on_post_resolve(Arc::new(|ctx: &mut QueryContext| {
                ctx.request_cname_chase();
                true
            }))
        },
    );

    let mut ctx = context("www.example.com", RecordType::A);
    let mut buffer = vec![answer("www.example.com", RecordType::A, "192.0.2.1")];

    let outcome = pipeline
        .dispatch(HookStage::PostResolve, &mut ctx, 0, Some(&mut buffer))
        .await
        .unwrap();

    assert!(outcome.handled);
    assert_eq!(outcome.rcode, 0);
    assert_eq!(resolver.call_count(), 0);
    assert_eq!(buffer.len(), 1);
}

#[tokio::test]
async fn test_chase_cname_appends_resolved_records() {
    let resolver = Arc::new(ScriptedResolver::new().respond_with(Resolution::new(
        rcode::NOERROR,
        vec![answer("target.example.net", RecordType::Aaaa, "2001:db8::1")],
    )));
    let pipeline = build_pipeline(
        resolver.clone(),
        Arc::new(ScriptedExchange::new()),
        EngineConfig::default(),
        |b| {
            b.on_post_resolve(Arc::new(|ctx: &mut QueryContext| {
                ctx.request_cname_chase();
                true
            }))
        },
    );

    // Original query type is AAAA; the chase must carry it over.
    let mut ctx = context("www.example.com", RecordType::Aaaa);
    let mut buffer = vec![answer(
        "www.example.com",
        RecordType::Cname,
        "target.example.net",
    )];

    let outcome = pipeline
        .dispatch(HookStage::PostResolve, &mut ctx, 2, Some(&mut buffer))
        .await
        .unwrap();

    assert!(outcome.handled);
    assert_eq!(outcome.rcode, rcode::NOERROR);
    assert_eq!(
        resolver.calls(),
        vec![("target.example.net".to_string(), RecordType::Aaaa)]
    );
    // Appended, not replaced.
    assert_eq!(buffer.len(), 2);
    assert_eq!(buffer[0].rtype, RecordType::Cname);
    assert_eq!(buffer[1].content, "2001:db8::1");
}

#[tokio::test]
async fn test_chase_cname_resolve_failure() {
    let resolver = Arc::new(
        ScriptedResolver::new().fail_with(HookError::ResolveFailure("upstream gone".to_string())),
    );
    let pipeline = build_pipeline(
        resolver,
        Arc::new(ScriptedExchange::new()),
        EngineConfig::default(),
        |b| {
            b.on_post_resolve(Arc::new(|ctx: &mut QueryContext| {
                ctx.request_cname_chase();
                true
            }))
        },
    );

    let mut ctx = context("www.example.com", RecordType::A);
    let mut buffer = vec![answer(
        "www.example.com",
        RecordType::Cname,
        "target.example.net",
    )];

    let outcome = pipeline
        .dispatch(HookStage::PostResolve, &mut ctx, 0, Some(&mut buffer))
        .await
        .unwrap();

    assert!(outcome.handled);
    assert_eq!(outcome.rcode, rcode::SERVFAIL);
}

#[tokio::test]
async fn test_synthesize_aaaa_rewrites_answer_a_records() {
    let resolver = Arc::new(ScriptedResolver::new().respond_with(Resolution::new(
        rcode::NOERROR,
        vec![
            answer("www.example.com", RecordType::A, "192.0.2.1"),
            record(
                "www.example.com",
                RecordType::A,
                RecordSection::Additional,
                "192.0.2.2",
            ),
            answer("www.example.com", RecordType::Txt, "\"note\""),
        ],
    )));
    let pipeline = build_pipeline(
        resolver.clone(),
        Arc::new(ScriptedExchange::new()),
        EngineConfig::default(),
        |b| {
            b.on_nodata(Arc::new(|ctx: &mut QueryContext| {
                ctx.request_aaaa_synthesis("64:ff9b::/96");
                true
            }))
        },
    );

    let mut ctx = context("www.example.com", RecordType::Aaaa);
    let mut buffer = Vec::new();

    let outcome = pipeline
        .dispatch(HookStage::OnNodata, &mut ctx, 0, Some(&mut buffer))
        .await
        .unwrap();

    assert!(outcome.handled);
    assert_eq!(outcome.rcode, rcode::NOERROR);
    assert_eq!(
        resolver.calls(),
        vec![("www.example.com".to_string(), RecordType::A)]
    );

    assert_eq!(buffer.len(), 3);

    let synthesized = &buffer[0];
    assert_eq!(synthesized.rtype, RecordType::Aaaa);
    assert_eq!(synthesized.content, "64:ff9b::c000:201");
    assert_eq!(&*synthesized.name, "www.example.com");
    assert_eq!(synthesized.ttl, 300);
    assert_eq!(synthesized.section, RecordSection::Answer);

    // Wrong section: passed through untouched.
    let additional = &buffer[1];
    assert_eq!(additional.rtype, RecordType::A);
    assert_eq!(additional.content, "192.0.2.2");

    // Wrong type: passed through untouched.
    let txt = &buffer[2];
    assert_eq!(txt.rtype, RecordType::Txt);
    assert_eq!(txt.content, "\"note\"");
}

#[tokio::test]
async fn test_synthesize_ptr_rewrites_owner_names() {
    let resolver = Arc::new(ScriptedResolver::new().respond_with(Resolution::new(
        rcode::NOERROR,
        vec![answer(
            "1.2.3.4.in-addr.arpa.",
            RecordType::Ptr,
            "host.example.net.",
        )],
    )));
    let reverse6 = "1.0.2.0.3.0.4.0.ip6.arpa.";
    let pipeline = build_pipeline(
        resolver.clone(),
        Arc::new(ScriptedExchange::new()),
        EngineConfig::default(),
        move |b| {
            b.on_pre_resolve(Arc::new(move |ctx: &mut QueryContext| {
                ctx.request_ptr_synthesis(reverse6);
                true
            }))
        },
    );

    let mut ctx = context(reverse6, RecordType::Ptr);
    let mut buffer = Vec::new();

    let outcome = pipeline
        .dispatch(HookStage::PreResolve, &mut ctx, 0, Some(&mut buffer))
        .await
        .unwrap();

    assert!(outcome.handled);
    assert_eq!(
        resolver.calls(),
        vec![("1.2.3.4.in-addr.arpa.".to_string(), RecordType::Ptr)]
    );
    assert_eq!(buffer.len(), 1);
    // Owner rewritten back to the original IPv6 reverse name.
    assert_eq!(&*buffer[0].name, reverse6);
    assert_eq!(buffer[0].content, "host.example.net.");
}

#[tokio::test]
async fn test_synthesize_ptr_malformed_name() {
    let resolver = Arc::new(ScriptedResolver::new());
    let pipeline = build_pipeline(
        resolver.clone(),
        Arc::new(ScriptedExchange::new()),
        EngineConfig::default(),
        |b| {
            b.on_pre_resolve(Arc::new(|ctx: &mut QueryContext| {
                ctx.request_ptr_synthesis("1.2.3.4.5.6");
                true
            }))
        },
    );

    let mut ctx = context("1.2.3.4.5.6", RecordType::Ptr);
    let mut buffer = vec![answer("leftover.example", RecordType::A, "192.0.2.1")];

    let outcome = pipeline
        .dispatch(HookStage::PreResolve, &mut ctx, 0, Some(&mut buffer))
        .await
        .unwrap();

    assert!(outcome.handled);
    assert_eq!(outcome.rcode, rcode::MALFORMED);
    assert_eq!(resolver.call_count(), 0);
    assert!(buffer.is_empty());
}

#[tokio::test]
async fn test_exchange_chain_overflow_is_fatal() {
    let exchange = Arc::new(ScriptedExchange::new());
    let pipeline = build_pipeline(
        Arc::new(ScriptedResolver::new()),
        exchange.clone(),
        EngineConfig {
            followup_chain_cap: 4,
            ..EngineConfig::default()
        },
        |b| {
            b.on_pre_resolve(Arc::new(|ctx: &mut QueryContext| {
                ctx.request_exchange("192.0.2.53:53".parse().unwrap(), &b"probe"[..], "again");
                true
            }))
            .bind_continuation(
                "again",
                Arc::new(|ctx: &mut QueryContext| {
                    // Misbehaving continuation: always asks for one more.
                    ctx.request_exchange(
                        "192.0.2.53:53".parse().unwrap(),
                        &b"probe"[..],
                        "again",
                    );
                    true
                }),
            )
        },
    );

    let mut ctx = context("www.example.com", RecordType::A);
    let result = pipeline
        .dispatch(HookStage::PreResolve, &mut ctx, 0, None)
        .await;

    assert!(matches!(
        result,
        Err(HookError::FollowupOverflow { cap: 4 })
    ));
    assert_eq!(exchange.call_count(), 4);
}

#[tokio::test]
async fn test_exchange_then_cname_chase_chain() {
    let resolver = Arc::new(ScriptedResolver::new().respond_with(Resolution::new(
        rcode::NOERROR,
        vec![answer("cdn.example.net", RecordType::A, "203.0.113.9")],
    )));
    let exchange = Arc::new(ScriptedExchange::new().respond_with(&b"cdn.example.net"[..]));

    let pipeline = build_pipeline(
        resolver.clone(),
        exchange.clone(),
        EngineConfig::default(),
        |b| {
            b.on_pre_resolve(Arc::new(|ctx: &mut QueryContext| {
                ctx.request_exchange("192.0.2.53:53".parse().unwrap(), &b"lookup"[..], "stitch");
                true
            }))
            .bind_continuation(
                "stitch",
                Arc::new(|ctx: &mut QueryContext| {
                    let target = String::from_utf8(ctx.exchange_answer.to_vec()).unwrap();
                    ctx.add_answer(RecordType::Cname, target, None, None);
                    ctx.request_cname_chase();
                    true
                }),
            )
        },
    );

    let mut ctx = context("www.example.com", RecordType::A);
    let mut buffer = Vec::new();

    let outcome = pipeline
        .dispatch(HookStage::PreResolve, &mut ctx, 0, Some(&mut buffer))
        .await
        .unwrap();

    assert!(outcome.handled);
    assert_eq!(outcome.rcode, rcode::NOERROR);
    assert_eq!(exchange.call_count(), 1);
    assert_eq!(
        resolver.calls(),
        vec![("cdn.example.net".to_string(), RecordType::A)]
    );
    assert_eq!(buffer.len(), 2);
    assert_eq!(buffer[0].rtype, RecordType::Cname);
    assert_eq!(buffer[1].content, "203.0.113.9");
}

#[tokio::test]
async fn test_exchange_failure_skips_continuation() {
    let invoked = Arc::new(AtomicBool::new(false));
    let invoked_in_cb = Arc::clone(&invoked);

    let exchange = Arc::new(ScriptedExchange::new().fail_with(HookError::ExchangeFailure {
        dest: "192.0.2.53:53".to_string(),
        reason: "timed out".to_string(),
    }));

    let pipeline = build_pipeline(
        Arc::new(ScriptedResolver::new()),
        exchange,
        EngineConfig::default(),
        move |b| {
            b.on_pre_resolve(Arc::new(|ctx: &mut QueryContext| {
                ctx.request_exchange("192.0.2.53:53".parse().unwrap(), &b"probe"[..], "cb");
                true
            }))
            .bind_continuation(
                "cb",
                Arc::new(move |_ctx: &mut QueryContext| {
                    invoked_in_cb.store(true, Ordering::SeqCst);
                    true
                }),
            )
        },
    );

    let mut ctx = context("www.example.com", RecordType::A);
    let outcome = pipeline
        .dispatch(HookStage::PreResolve, &mut ctx, 0, None)
        .await
        .unwrap();

    assert!(outcome.handled);
    assert_eq!(outcome.rcode, rcode::SERVFAIL);
    assert!(!invoked.load(Ordering::SeqCst));
}

#[tokio::test]
async fn test_empty_followup_keeps_hook_records() {
    let pipeline = build_pipeline(
        Arc::new(ScriptedResolver::new()),
        Arc::new(ScriptedExchange::new()),
        EngineConfig::default(),
        |b| {
            b.on_nxdomain(Arc::new(|ctx: &mut QueryContext| {
                ctx.add_answer(RecordType::A, "198.51.100.1", Some(30), None);
                ctx.rcode = rcode::NOERROR;
                true
            }))
        },
    );

    let mut ctx = context("rescued.example", RecordType::A);
    let mut buffer = Vec::new();

    let outcome = pipeline
        .dispatch(HookStage::OnNxdomain, &mut ctx, rcode::NXDOMAIN, Some(&mut buffer))
        .await
        .unwrap();

    assert!(outcome.handled);
    assert_eq!(outcome.rcode, rcode::NOERROR);
    assert_eq!(buffer.len(), 1);
    assert_eq!(&*buffer[0].name, "rescued.example");
}
