use super::pipeline::{DispatchOutcome, HookPipeline};
use quill_dns_domain::{
    rcode, translate, DnsClass, Followup, HookError, QueryContext, RecordSection, RecordType,
};
use std::net::IpAddr;
use std::sync::Arc;
use tracing::{error, warn};

impl HookPipeline {
    /// Drain the followup left behind by a handled hook.
    ///
    /// CNAME chase and the two synthesis followups run once and
    /// terminate. The outgoing exchange re-enters its named continuation,
    /// which may request any followup in turn; the number of exchanges in
    /// one dispatch is capped, and exceeding the cap aborts the dispatch
    /// with a hard error.
    pub(crate) async fn run_followups(
        &self,
        ctx: &mut QueryContext,
    ) -> Result<DispatchOutcome, HookError> {
        let cap = self.config.followup_chain_cap;
        let mut exchanges: u32 = 0;

        loop {
            let ret = ctx.rcode;
            match ctx.followup {
                Followup::None => {
                    return Ok(DispatchOutcome {
                        handled: true,
                        rcode: ret,
                    })
                }
                Followup::ChaseCname => {
                    let rcode = self.chase_cname(ctx, ret).await;
                    return Ok(DispatchOutcome {
                        handled: true,
                        rcode,
                    });
                }
                Followup::SynthesizeAaaa => {
                    let rcode = self.synthesize_aaaa(ctx).await;
                    return Ok(DispatchOutcome {
                        handled: true,
                        rcode,
                    });
                }
                Followup::SynthesizePtr => {
                    let rcode = self.synthesize_ptr(ctx).await;
                    return Ok(DispatchOutcome {
                        handled: true,
                        rcode,
                    });
                }
                Followup::OutgoingExchange => {
                    exchanges += 1;
                    if exchanges > cap {
                        error!(cap, qname = %ctx.qname(), "Followup chain exceeded its cap");
                        return Err(HookError::FollowupOverflow { cap });
                    }

                    let dest = match ctx.exchange_dest {
                        Some(dest) => dest,
                        None => {
                            warn!(qname = %ctx.qname(), "Exchange followup without a destination");
                            return Ok(DispatchOutcome {
                                handled: true,
                                rcode: rcode::MALFORMED,
                            });
                        }
                    };

                    let request = ctx.exchange_query.clone();
                    match self
                        .exchange
                        .exchange(dest, &request, self.config.exchange_timeout())
                        .await
                    {
                        Ok(answer) => ctx.exchange_answer = answer,
                        Err(e) => {
                            warn!(error = %e, dest = %dest, "Outgoing exchange failed");
                            return Ok(DispatchOutcome {
                                handled: true,
                                rcode: rcode::SERVFAIL,
                            });
                        }
                    }

                    let callback = match self.continuation(&ctx.exchange_callback) {
                        Some(callback) => callback,
                        None => {
                            let missing =
                                HookError::MissingBinding(ctx.exchange_callback.clone());
                            error!(error = %missing, "Exchange continuation lookup failed");
                            return Ok(DispatchOutcome {
                                handled: false,
                                rcode: ret,
                            });
                        }
                    };

                    if !callback(ctx) {
                        return Ok(DispatchOutcome {
                            handled: false,
                            rcode: ctx.rcode,
                        });
                    }
                    // The continuation may have requested any followup,
                    // including another exchange; loop and find out.
                }
            }
        }
    }

    /// Resolve the target of the first CNAME in the record set and append
    /// the results. No CNAME present is a no-op.
    async fn chase_cname(&self, ctx: &mut QueryContext, current: i32) -> i32 {
        let target = ctx
            .records
            .iter()
            .find(|r| r.rtype == RecordType::Cname)
            .map(|r| r.content.clone());
        let target = match target {
            Some(target) => target,
            None => return current,
        };

        match self
            .resolver
            .resolve(&target, ctx.qtype(), DnsClass::In)
            .await
        {
            Ok(resolution) => {
                ctx.records.extend(resolution.records);
                resolution.rcode
            }
            Err(e) => {
                warn!(error = %e, target = %target, "CNAME chase failed");
                rcode::SERVFAIL
            }
        }
    }

    /// Resolve A records for the query name and rewrite every ANSWER A
    /// record into the AAAA record for its translated address. The
    /// resolved set replaces the context records.
    async fn synthesize_aaaa(&self, ctx: &mut QueryContext) -> i32 {
        let prefix_text = if ctx.followup_prefix.is_empty() {
            self.config.nat64_prefix.clone()
        } else {
            ctx.followup_prefix.clone()
        };
        let prefix = match translate::parse_nat64_prefix(&prefix_text) {
            Ok(prefix) => prefix,
            Err(e) => {
                warn!(error = %e, prefix = %prefix_text, "AAAA synthesis rejected");
                ctx.records.clear();
                return rcode::MALFORMED;
            }
        };

        let resolution = match self
            .resolver
            .resolve(ctx.qname(), RecordType::A, DnsClass::In)
            .await
        {
            Ok(resolution) => resolution,
            Err(e) => {
                warn!(error = %e, qname = %ctx.qname(), "A lookup for AAAA synthesis failed");
                return rcode::SERVFAIL;
            }
        };

        let mut records = resolution.records;
        for record in &mut records {
            if record.rtype == RecordType::A && record.section == RecordSection::Answer {
                if let Some(IpAddr::V4(addr)) = record.ip_addr() {
                    let mapped = translate::embed_ipv4(prefix, addr);
                    record.rewrite(RecordType::Aaaa, mapped.to_string());
                }
            }
        }
        ctx.records = records;
        resolution.rcode
    }

    /// Decode the IPv4 address embedded in an IPv6 reverse name, resolve
    /// PTR for the IPv4 reverse name, and rewrite the answers back onto
    /// the original owner name.
    async fn synthesize_ptr(&self, ctx: &mut QueryContext) -> i32 {
        let original: Arc<str> = ctx.followup_name.as_str().into();
        let reverse4 = match translate::reverse6_to_reverse4(&original) {
            Ok(reverse4) => reverse4,
            Err(e) => {
                warn!(error = %e, name = %original, "PTR synthesis rejected");
                ctx.records.clear();
                return rcode::MALFORMED;
            }
        };

        match self
            .resolver
            .resolve(&reverse4, RecordType::Ptr, DnsClass::In)
            .await
        {
            Ok(resolution) => {
                let mut records = resolution.records;
                for record in &mut records {
                    if record.rtype == RecordType::Ptr && record.section == RecordSection::Answer {
                        record.name = Arc::clone(&original);
                    }
                }
                ctx.records = records;
                resolution.rcode
            }
            Err(e) => {
                warn!(error = %e, query = %reverse4, "PTR lookup failed");
                rcode::SERVFAIL
            }
        }
    }
}
