#[cfg(test)]
mod unit_tests {
    use crate::action::{Intent, Phase, PlayerId};
    use crate::errors::RoomError;
    use crate::event::{Delivery, GameOverKind, RoomEvent, Target};
    use crate::fan::Fan;
    use crate::parser::{parse_tile, parse_tiles};
    use crate::rule::GameRule;
    use crate::state::legal_actions::RoomLegalActions;
    use crate::state::wall::full_set;
    use crate::state::Room;
    use crate::tile::{Tile, NUM_TILES};
    use crate::types::{remove_one, MeldKind};

    // Dealer discards 5b or 7w; only 7w is claimable (seat 1 chows 7w 8w 9w).
    const QUIET: [&str; 4] = [
        "5b 1w 4w 7w 1t 4t 7t dong nan xi bei zhong fa",
        "2w 5w 8w 9w 2t 5t 8t 1b dong nan xi bei zhong",
        "3w 6w 9w 3t 6t 9t 2b 8b dong nan xi bei fa",
        "1w 4w 7w 1t 4t 7t 3b 7b zhong fa bai 2w 5w",
    ];

    // Dealer discards 3w; seat 2 holds a pair of it.
    const PONG: [&str; 4] = [
        "3w 1w 7w 1t 4t 7t dong nan xi bei zhong fa 9b",
        "6w 9w 2t 5t 8t 1b 5b 9b dong nan xi bei zhong",
        "3w 3w 8w 3t 6t 9t 2b 6b dong nan xi bei fa",
        "1w 7w 2t 4t 7t 3b 7b zhong fa bai 5w 8b 4b",
    ];

    // Dealer discards 5t; seat 2 can pong it, seat 3 wins on it.
    const CONTESTED: [&str; 4] = [
        "5t 1w 4w 1t 9t nan xi bei zhong fa 2b 8b 9b",
        "2w 5w 1b 3b 7b 9b 1t 2t 9t nan xi bei zhong",
        "5t 5t 6w 9w 3b 8t 3t nan xi bei zhong fa fa",
        "1w 2w 3w 4b 5b 6b 7w 8w 9w dong dong 6t 7t",
    ];

    fn t(s: &str) -> Tile {
        parse_tile(s).unwrap()
    }

    /// Wall that deals `hands` in seat order, then `extra` to the dealer,
    /// then `draws`, then everything else in rank order.
    fn stacked_wall(hands: [&str; 4], extra: &str, draws: &[&str]) -> Vec<Tile> {
        let mut front = Vec::new();
        for h in hands {
            let tiles = parse_tiles(h).unwrap();
            assert_eq!(tiles.len(), 13, "hand {h:?}");
            front.extend(tiles);
        }
        front.push(t(extra));
        front.extend(draws.iter().map(|d| t(d)));

        let mut rest = full_set();
        for tile in &front {
            assert!(remove_one(&mut rest, *tile), "too many copies of {tile}");
        }
        front.extend(rest);
        front
    }

    fn seated(rule: GameRule) -> (Room, Vec<PlayerId>) {
        let ids: Vec<PlayerId> = ["p0", "p1", "p2", "p3"].map(PlayerId::from).to_vec();
        let mut room = Room::new("r1", ids[0].clone(), "East", rule, Some(1));
        for (id, name) in ids.iter().zip(["East", "South", "West", "North"]).skip(1) {
            room.add_player(id.clone(), name).unwrap();
        }
        (room, ids)
    }

    fn started(hands: [&str; 4], extra: &str, draws: &[&str], rule: GameRule) -> (Room, Vec<PlayerId>) {
        let (mut room, ids) = seated(rule);
        room.start_game_with_wall(&ids[0], stacked_wall(hands, extra, draws))
            .unwrap();
        (room, ids)
    }

    fn names(out: &[Delivery]) -> Vec<&'static str> {
        out.iter().map(|d| d.event.name()).collect()
    }

    fn targeted<'a>(out: &'a [Delivery], who: &PlayerId) -> Vec<&'a RoomEvent> {
        out.iter()
            .filter(|d| d.target == Target::Player(who.clone()))
            .map(|d| &d.event)
            .collect()
    }

    // ------------------------------------------------------------------
    // Lobby
    // ------------------------------------------------------------------

    #[test]
    fn test_seating_rules() {
        let (mut room, ids) = seated(GameRule::default());
        assert_eq!(room.add_player(PlayerId::from("p4"), "Late"), Err(RoomError::RoomFull));
        assert_eq!(
            room.add_player(ids[1].clone(), "Again"),
            Err(RoomError::AlreadySeated {
                player: "p1".into()
            })
        );
        assert_eq!(room.created_event().len(), 1);
        assert_eq!(room.created_event()[0].target, Target::Player(ids[0].clone()));
    }

    #[test]
    fn test_start_game_preconditions() {
        let ids: Vec<PlayerId> = ["a", "b", "c"].map(PlayerId::from).to_vec();
        let mut room = Room::new("r", ids[0].clone(), "A", GameRule::default(), None);
        room.add_player(ids[1].clone(), "B").unwrap();
        room.add_player(ids[2].clone(), "C").unwrap();
        assert_eq!(
            room.apply(&ids[0], Intent::StartGame),
            Err(RoomError::NotEnoughPlayers { seated: 3 })
        );

        room.add_player(PlayerId::from("d"), "D").unwrap();
        assert_eq!(room.apply(&ids[1], Intent::StartGame), Err(RoomError::NotHost));
        assert_eq!(room.apply(&ids[1], Intent::DrawTile), Err(RoomError::NotStarted));

        room.apply(&ids[0], Intent::StartGame).unwrap();
        assert_eq!(room.apply(&ids[0], Intent::StartGame), Err(RoomError::AlreadyStarted));
        assert_eq!(
            room.add_player(PlayerId::from("e"), "E"),
            Err(RoomError::AlreadyStarted)
        );
    }

    #[test]
    fn test_unknown_player_is_rejected() {
        let (mut room, _) = started(QUIET, "bai", &[], GameRule::default());
        assert!(matches!(
            room.apply(&PlayerId::from("ghost"), Intent::DrawTile),
            Err(RoomError::UnknownPlayer { .. })
        ));
    }

    // ------------------------------------------------------------------
    // Dealing and turns
    // ------------------------------------------------------------------

    #[test]
    fn test_deal_counts() {
        let (mut room, ids) = seated(GameRule::default());
        let out = room.apply(&ids[0], Intent::StartGame).unwrap();

        assert_eq!(room.players[0].hand.len(), 14);
        for p in &room.players[1..] {
            assert_eq!(p.hand.len(), 13);
        }
        assert_eq!(room.wall.len(), NUM_TILES - 14 - 13 * 3);
        assert_eq!(room.wall.len(), 83);
        assert_eq!(room.current_player, 0);
        assert_eq!(room.phase, Phase::WaitAct);
        assert!(!room.needs_draw);
        assert!(room.check_invariants().is_ok());

        // one private game_started per seat, then can_play for the dealer
        assert_eq!(names(&out), vec![
            "game_started",
            "game_started",
            "game_started",
            "game_started",
            "can_play"
        ]);
        for (seat, id) in ids.iter().enumerate() {
            let mine = targeted(&out, id);
            match mine[0] {
                RoomEvent::GameStarted {
                    hand, player_index, ..
                } => {
                    assert_eq!(*player_index, seat);
                    assert_eq!(hand, &room.players[seat].hand);
                }
                other => panic!("unexpected {other:?}"),
            }
        }
        assert!(out.iter().all(|d| d.target != Target::Room));
    }

    #[test]
    fn test_hands_are_sorted_suit_first() {
        let (room, _) = started(QUIET, "bai", &[], GameRule::default());
        let rendered: Vec<String> = room.players[0].hand.iter().map(Tile::to_string).collect();
        assert_eq!(rendered[..4], ["1w", "4w", "7w", "5b"]);
        assert_eq!(rendered.last().map(String::as_str), Some("bai"));
    }

    #[test]
    fn test_unclaimed_discard_advances_turn() {
        let (mut room, ids) = started(QUIET, "bai", &[], GameRule::default());
        let out = room.apply(&ids[0], Intent::PlayTile(t("5b"))).unwrap();

        assert_eq!(names(&out), vec!["tile_played", "next_turn"]);
        assert!(out.iter().all(|d| d.target == Target::Room));
        assert_eq!(room.current_player, 1);
        assert_eq!(room.last_discard, None);
        assert!(room.claim_window.is_none());
        assert!(room.needs_draw);
        assert_eq!(room.players[0].discards, vec![t("5b")]);
    }

    #[test]
    fn test_turn_order_errors() {
        let (mut room, ids) = started(QUIET, "bai", &[], GameRule::default());
        assert_eq!(room.apply(&ids[0], Intent::DrawTile), Err(RoomError::MustDiscardFirst));
        assert_eq!(room.apply(&ids[1], Intent::DrawTile), Err(RoomError::NotYourTurn));
        assert_eq!(
            room.apply(&ids[0], Intent::PlayTile(t("9t"))),
            Err(RoomError::TileNotInHand { tile: "9t".into() })
        );

        room.apply(&ids[0], Intent::PlayTile(t("5b"))).unwrap();
        assert_eq!(room.apply(&ids[1], Intent::PlayTile(t("2w"))), Err(RoomError::MustDrawFirst));
        let hand_before = room.players[1].hand.clone();
        let out = room.apply(&ids[1], Intent::DrawTile).unwrap();
        assert_eq!(names(&out), vec!["tile_drawn", "game_state"]);
        assert_eq!(out[0].target, Target::Player(ids[1].clone()));
        assert_eq!(room.players[1].hand.len(), hand_before.len() + 1);
        assert_eq!(room.apply(&ids[1], Intent::DrawTile), Err(RoomError::MustDiscardFirst));
    }

    #[test]
    fn test_rejected_intent_leaves_state_untouched() {
        let (mut room, ids) = started(QUIET, "bai", &[], GameRule::default());
        let hand = room.players[0].hand.clone();
        let wall = room.wall.len();
        assert!(room.apply(&ids[0], Intent::PlayTile(t("9t"))).is_err());
        assert!(room.apply(&ids[0], Intent::ClaimPong).is_err());
        assert!(room.apply(&ids[0], Intent::Pass).is_err());
        assert_eq!(room.players[0].hand, hand);
        assert_eq!(room.wall.len(), wall);
        assert_eq!(room.phase, Phase::WaitAct);
    }

    // ------------------------------------------------------------------
    // Claims
    // ------------------------------------------------------------------

    #[test]
    fn test_pong_round_trip() {
        let (mut room, ids) = started(PONG, "bai", &[], GameRule::default());
        let out = room.apply(&ids[0], Intent::PlayTile(t("3w"))).unwrap();

        assert_eq!(names(&out), vec!["tile_played", "can_claim"]);
        match targeted(&out, &ids[2])[0] {
            RoomEvent::CanClaim {
                can_pong,
                can_kong,
                can_chow,
                can_win,
                tile,
                ..
            } => {
                assert!(*can_pong);
                assert!(!*can_kong && !*can_chow && !*can_win);
                assert_eq!(*tile, t("3w"));
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(room.phase, Phase::WaitResponse);
        assert_eq!(room.legal_intents(&ids[2]), vec![Intent::ClaimPong, Intent::Pass]);
        assert!(room.legal_intents(&ids[1]).is_empty());

        let before = room.players[2].hand.len();
        let out = room.apply(&ids[2], Intent::ClaimPong).unwrap();
        assert_eq!(names(&out), vec!["pong_claimed", "update_hand", "game_state", "can_play"]);

        let p2 = &room.players[2];
        assert_eq!(p2.hand.len(), before - 2);
        assert!(!p2.hand.contains(&t("3w")));
        assert_eq!(p2.melds.len(), 1);
        assert_eq!(p2.melds[0].kind, MeldKind::Triplet);
        assert_eq!(p2.melds[0].tiles, vec![t("3w"); 3]);
        assert_eq!(p2.melds[0].from_seat, Some(0));
        assert_eq!(room.current_player, 2);
        assert!(room.players[0].discards.is_empty());
        assert_eq!(room.last_discard, None);

        // owes a discard, not a draw, and may not self-draw win
        assert_eq!(room.apply(&ids[2], Intent::DrawTile), Err(RoomError::MustDiscardFirst));
        assert_eq!(
            room.apply(&ids[2], Intent::DeclareWin { is_self_draw: true }),
            Err(RoomError::CannotWin)
        );
        room.apply(&ids[2], Intent::PlayTile(t("8w"))).unwrap();
        assert!(room.check_invariants().is_ok());
    }

    #[test]
    fn test_claim_after_resolution_is_stale() {
        let (mut room, ids) = started(PONG, "bai", &[], GameRule::default());
        room.apply(&ids[0], Intent::PlayTile(t("3w"))).unwrap();
        let seq = room.open_claim_seq().unwrap();
        room.apply(&ids[2], Intent::ClaimPong).unwrap();

        assert_eq!(room.apply(&ids[2], Intent::Pass), Err(RoomError::StaleClaim));
        assert_eq!(room.expire_claim_window(seq), Err(RoomError::StaleClaim));
    }

    #[test]
    fn test_pass_closes_window_once() {
        let (mut room, ids) = started(PONG, "bai", &[], GameRule::default());
        room.apply(&ids[0], Intent::PlayTile(t("3w"))).unwrap();
        assert!(matches!(
            room.apply(&ids[1], Intent::Pass),
            Err(RoomError::InvalidClaim { .. })
        ));

        let out = room.apply(&ids[2], Intent::Pass).unwrap();
        assert_eq!(names(&out), vec!["next_turn"]);
        assert_eq!(room.current_player, 1);
        assert!(room.needs_draw);
        // the discard stays in the pond
        assert_eq!(room.players[0].discards, vec![t("3w")]);

        assert_eq!(room.apply(&ids[2], Intent::Pass), Err(RoomError::StaleClaim));
        assert_eq!(room.current_player, 1);
    }

    #[test]
    fn test_timeout_is_a_universal_pass() {
        let (mut room, ids) = started(PONG, "bai", &[], GameRule::default());
        room.apply(&ids[0], Intent::PlayTile(t("3w"))).unwrap();
        let seq = room.open_claim_seq().unwrap();

        assert_eq!(room.expire_claim_window(seq + 1), Err(RoomError::StaleClaim));
        let out = room.expire_claim_window(seq).unwrap();
        assert_eq!(names(&out), vec!["next_turn"]);
        assert_eq!(room.current_player, 1);
        assert_eq!(room.apply(&ids[2], Intent::ClaimPong), Err(RoomError::StaleClaim));
    }

    #[test]
    fn test_chow_from_previous_seat() {
        let (mut room, ids) = started(QUIET, "bai", &[], GameRule::default());
        let out = room.apply(&ids[0], Intent::PlayTile(t("7w"))).unwrap();
        match targeted(&out, &ids[1])[0] {
            RoomEvent::CanClaim {
                can_chow,
                chow_options,
                ..
            } => {
                assert!(*can_chow);
                assert_eq!(chow_options, &vec![[t("7w"), t("8w"), t("9w")]]);
            }
            other => panic!("unexpected {other:?}"),
        }
        // not adjacent, not eligible
        assert!(matches!(
            room.apply(&ids[3], Intent::ClaimChow(None)),
            Err(RoomError::InvalidClaim { .. })
        ));
        assert!(matches!(
            room.apply(&ids[1], Intent::ClaimChow(Some([t("5w"), t("6w"), t("7w")]))),
            Err(RoomError::InvalidClaim { .. })
        ));

        let out = room.apply(&ids[1], Intent::ClaimChow(None)).unwrap();
        assert_eq!(names(&out)[0], "chow_claimed");
        let meld = &room.players[1].melds[0];
        assert_eq!(meld.kind, MeldKind::Run);
        assert_eq!(meld.tiles, vec![t("7w"), t("8w"), t("9w")]);
        assert_eq!(meld.called_tile, Some(t("7w")));
        assert!(!room.players[1].hand.contains(&t("8w")));
        assert_eq!(room.current_player, 1);
        assert_eq!(room.players[1].turn_tile_count(), 14);
    }

    #[test]
    fn test_kong_on_discard_draws_supplement() {
        let mut hands = PONG;
        hands[2] = "3w 3w 3w 3t 6t 9t 2b 6b dong nan xi bei fa";
        let (mut room, ids) = started(hands, "bai", &["9w"], GameRule::default());
        room.apply(&ids[0], Intent::PlayTile(t("3w"))).unwrap();
        assert_eq!(room.legal_intents(&ids[2]), vec![
            Intent::ClaimKong,
            Intent::ClaimPong,
            Intent::Pass
        ]);

        let wall = room.wall.len();
        let out = room.apply(&ids[2], Intent::ClaimKong).unwrap();
        assert_eq!(names(&out), vec![
            "kong_claimed",
            "update_hand",
            "tile_drawn_after_kong",
            "game_state",
            "can_play"
        ]);
        assert_eq!(out[2].event, RoomEvent::TileDrawnAfterKong { tile: t("9w") });
        assert_eq!(room.wall.len(), wall - 1);
        let p2 = &room.players[2];
        assert_eq!(p2.melds[0].kind, MeldKind::Quad);
        assert_eq!(p2.melds[0].tiles.len(), 4);
        assert!(!p2.melds[0].is_concealed());
        assert_eq!(p2.turn_tile_count(), 14);
        assert_eq!(room.drawn_tile, Some(t("9w")));
        assert!(room.check_invariants().is_ok());
    }

    #[test]
    fn test_concealed_kong() {
        let hands = [
            "fa fa fa fa 1w 4w 7w 1t 4t 7t dong nan xi",
            "2w 5w 8w 9w 2t 5t 8t 1b dong nan xi bei zhong",
            "3w 6w 9w 3t 6t 9t 2b 8b dong nan xi bei bai",
            "1w 4w 7w 1t 4t 7t 3b 7b zhong bai bai 2w 5w",
        ];
        let (mut room, ids) = started(hands, "5b", &["9b"], GameRule::default());
        assert!(room.legal_intents(&ids[0]).contains(&Intent::ConcealedKong(t("fa"))));
        assert!(matches!(
            room.apply(&ids[0], Intent::ConcealedKong(t("dong"))),
            Err(RoomError::InvalidClaim { .. })
        ));

        let out = room.apply(&ids[0], Intent::ConcealedKong(t("fa"))).unwrap();
        assert!(names(&out).contains(&"tile_drawn_after_kong"));
        let p0 = &room.players[0];
        assert!(p0.melds[0].is_concealed());
        assert_eq!(p0.hand.len(), 11);
        assert!(p0.hand.contains(&t("9b")));
        assert_eq!(room.current_player, 0);
        assert!(!room.needs_draw);
        room.apply(&ids[0], Intent::PlayTile(t("9b"))).unwrap();
        assert!(room.check_invariants().is_ok());
    }

    // ------------------------------------------------------------------
    // Winning
    // ------------------------------------------------------------------

    #[test]
    fn test_self_draw_full_flush_scores_seven() {
        let hands = [
            "1w 1w 1w 2w 2w 2w 3w 3w 3w 4w 4w 4w 5w",
            "6w 9w 2t 5t 8t 1b 5b 9b dong nan xi bei zhong",
            "8w 3t 6t 9t 2b 6b dong nan xi bei fa 7w 1t",
            "7w 2t 4t 7t 3b 7b zhong fa bai 5w 8b 4b 1w",
        ];
        let (mut room, ids) = started(hands, "5w", &[], GameRule::default());
        assert_eq!(room.legal_intents(&ids[0])[0], Intent::DeclareWin { is_self_draw: true });

        let out = room
            .apply(&ids[0], Intent::DeclareWin { is_self_draw: true })
            .unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].target, Target::Room);
        let RoomEvent::GameOver(over) = &out[0].event else {
            panic!("expected game_over");
        };
        assert_eq!(over.kind, GameOverKind::Win);
        assert_eq!(over.winner_index, Some(0));
        assert_eq!(over.is_self_draw, Some(true));
        let fan = over.fan.as_ref().unwrap();
        assert_eq!(fan.fans, vec![Fan::SelfDraw, Fan::FullFlush]);
        assert_eq!(fan.total, 7);
        assert!(!fan.contains(Fan::AllTriplets));

        assert_eq!(room.players[0].score, 7);
        assert!(room.is_over());
        assert_eq!(room.apply(&ids[0], Intent::PlayTile(t("5w"))), Err(RoomError::GameOver));
    }

    #[test]
    fn test_non_winning_declaration_is_rejected() {
        let (mut room, ids) = started(QUIET, "bai", &[], GameRule::default());
        assert_eq!(
            room.apply(&ids[0], Intent::DeclareWin { is_self_draw: true }),
            Err(RoomError::CannotWin)
        );
        assert_eq!(room.phase, Phase::WaitAct);
    }

    #[test]
    fn test_discard_win_moves_tile_into_hand() {
        let (mut room, ids) = started(CONTESTED, "bai", &[], GameRule::default());
        room.apply(&ids[0], Intent::PlayTile(t("5t"))).unwrap();
        assert_eq!(room.legal_intents(&ids[3]), vec![
            Intent::DeclareWin {
                is_self_draw: false
            },
            Intent::Pass
        ]);
        assert_eq!(
            room.apply(&ids[2], Intent::DeclareWin { is_self_draw: false }),
            Err(RoomError::CannotWin)
        );

        let out = room
            .apply(&ids[3], Intent::DeclareWin { is_self_draw: false })
            .unwrap();
        assert_eq!(names(&out), vec!["game_over"]);
        assert_eq!(room.players[3].hand.len(), 14);
        assert!(room.players[3].hand.contains(&t("5t")));
        assert!(room.players[0].discards.is_empty());
        assert_eq!(room.players[3].score, 1);
        assert_eq!(room.game_over.as_ref().and_then(|g| g.winner_index), Some(3));
        assert!(room.check_invariants().is_ok());
    }

    #[test]
    fn test_first_come_lets_a_pong_beat_a_win() {
        let (mut room, ids) = started(CONTESTED, "bai", &[], GameRule::reference());
        room.apply(&ids[0], Intent::PlayTile(t("5t"))).unwrap();
        room.apply(&ids[2], Intent::ClaimPong).unwrap();
        assert_eq!(room.current_player, 2);
        assert_eq!(
            room.apply(&ids[3], Intent::DeclareWin { is_self_draw: false }),
            Err(RoomError::StaleClaim)
        );
    }

    #[test]
    fn test_precedence_lets_a_win_beat_an_earlier_pong() {
        let (mut room, ids) = started(CONTESTED, "bai", &[], GameRule::precedence());
        room.apply(&ids[0], Intent::PlayTile(t("5t"))).unwrap();

        let out = room.apply(&ids[2], Intent::ClaimPong).unwrap();
        assert!(out.is_empty());
        assert_eq!(room.phase, Phase::WaitResponse);
        assert!(room.legal_intents(&ids[2]).is_empty());

        let out = room
            .apply(&ids[3], Intent::DeclareWin { is_self_draw: false })
            .unwrap();
        assert_eq!(names(&out), vec!["game_over"]);
        assert_eq!(room.game_over.as_ref().and_then(|g| g.winner_index), Some(3));
        assert!(room.players[2].melds.is_empty());
    }

    #[test]
    fn test_precedence_win_ends_the_game_without_waiting() {
        let (mut room, ids) = started(CONTESTED, "bai", &[], GameRule::precedence());
        room.apply(&ids[0], Intent::PlayTile(t("5t"))).unwrap();

        // seat 2 could only pong, so seat 3's win is already unbeatable
        let out = room
            .apply(&ids[3], Intent::DeclareWin { is_self_draw: false })
            .unwrap();
        assert_eq!(names(&out), vec!["game_over"]);
        assert!(room.is_over());
        assert_eq!(room.game_over.as_ref().and_then(|g| g.winner_index), Some(3));
        assert_eq!(room.open_claim_seq(), None);
        assert_eq!(room.apply(&ids[2], Intent::ClaimPong), Err(RoomError::GameOver));
    }

    #[test]
    fn test_precedence_timeout_resolves_recorded_claims() {
        let (mut room, ids) = started(CONTESTED, "bai", &[], GameRule::precedence());
        room.apply(&ids[0], Intent::PlayTile(t("5t"))).unwrap();
        room.apply(&ids[2], Intent::ClaimPong).unwrap();

        let seq = room.open_claim_seq().unwrap();
        let out = room.expire_claim_window(seq).unwrap();
        assert_eq!(names(&out)[0], "pong_claimed");
        assert_eq!(room.current_player, 2);
        assert_eq!(room.players[2].melds.len(), 1);
    }

    // ------------------------------------------------------------------
    // Exhaustion and disconnects
    // ------------------------------------------------------------------

    /// Draws, discards the lowest tile and passes on every claim until the
    /// game ends.
    fn play_out(room: &mut Room) -> Vec<Delivery> {
        let mut out = Vec::new();
        for _ in 0..1_000 {
            if room.is_over() {
                break;
            }
            let (seat, intent) = match room.phase {
                Phase::WaitAct => {
                    let seat = room.current_player;
                    let intent = if room.needs_draw {
                        Intent::DrawTile
                    } else {
                        Intent::PlayTile(room.players[seat].hand[0])
                    };
                    (seat, intent)
                }
                Phase::WaitResponse => {
                    let window = room.claim_window.as_ref().unwrap();
                    (window.awaiting().next().unwrap(), Intent::Pass)
                }
                other => panic!("unexpected phase {other:?}"),
            };
            let id = room.players[seat].id.clone();
            out.extend(room.apply(&id, intent).unwrap());
        }
        out
    }

    #[test]
    fn test_wall_exhaustion_ends_in_a_draw() {
        let (mut room, ids) = seated(GameRule::default());
        room.apply(&ids[0], Intent::StartGame).unwrap();
        let out = play_out(&mut room);

        assert!(room.is_over());
        assert_eq!(room.wall.len(), 0);
        let last = out.last().unwrap();
        assert_eq!(last.target, Target::Room);
        let RoomEvent::GameOver(over) = &last.event else {
            panic!("expected game_over, got {:?}", last.event);
        };
        assert_eq!(over.kind, GameOverKind::Draw);
        assert!(over.winner_id.is_none());

        let current = room.current_player;
        let hand = room.players[current].hand.clone();
        assert_eq!(room.apply(&ids[current], Intent::DrawTile), Err(RoomError::GameOver));
        assert_eq!(
            room.apply(&ids[current], Intent::PlayTile(hand[0])),
            Err(RoomError::GameOver)
        );
        assert_eq!(room.players[current].hand, hand);
        assert_eq!(room.tile_total(), NUM_TILES);
    }

    #[test]
    fn test_concealed_tiles_never_broadcast() {
        let (mut room, ids) = seated(GameRule::default());
        let mut out = room.apply(&ids[0], Intent::StartGame).unwrap();
        out.extend(play_out(&mut room));
        for d in &out {
            if d.event.is_private() {
                assert_ne!(d.target, Target::Room, "{} was broadcast", d.event.name());
            }
        }
    }

    #[test]
    fn test_leaving_before_start_promotes_next_host() {
        let (mut room, ids) = seated(GameRule::default());
        let out = room.remove_player(&ids[0]).unwrap();
        assert_eq!(names(&out), vec!["player_left"]);
        assert_eq!(room.players.len(), 3);
        assert_eq!(room.players[0].id, ids[1]);

        room.add_player(PlayerId::from("p4"), "Late").unwrap();
        assert_eq!(room.apply(&ids[2], Intent::StartGame), Err(RoomError::NotHost));
        assert!(room.apply(&ids[1], Intent::StartGame).is_ok());
    }

    #[test]
    fn test_disconnect_mid_game_keeps_the_seat() {
        let (mut room, ids) = started(PONG, "bai", &[], GameRule::default());
        room.apply(&ids[0], Intent::PlayTile(t("3w"))).unwrap();

        // seat 2 was the only one who could claim; its silence is a pass
        let out = room.remove_player(&ids[2]).unwrap();
        assert_eq!(names(&out), vec!["player_left", "next_turn"]);
        assert_eq!(room.players.len(), 4);
        assert!(!room.players[2].connected);
        assert_eq!(room.connected_count(), 3);
        assert_eq!(room.players[2].hand.len(), 13);
        assert_eq!(
            room.apply(&ids[2], Intent::Pass),
            Err(RoomError::PlayerDisconnected { seat: 2 })
        );
        assert!(room.legal_intents(&ids[2]).is_empty());
        assert!(room.check_invariants().is_ok());
    }

    #[test]
    fn test_legal_intents_at_deal() {
        let (room, ids) = started(QUIET, "bai", &[], GameRule::default());
        let legals = room.legal_intents(&ids[0]);
        assert_eq!(legals.len(), 14);
        assert!(legals.iter().all(|i| matches!(i, Intent::PlayTile(_))));
        assert!(room.legal_intents(&ids[1]).is_empty());
    }
}
